use std::fs;

use carelink_config::{ConfigError, Settings};

#[test]
fn relative_root_resolves_against_config_dir() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("carelink.toml");
    fs::write(&path, "root = \"operators\"\nworkers = 2\n").unwrap();

    let s = Settings::load(&path).unwrap();
    assert_eq!(s.root, dir.path().join("operators"));
    assert_eq!(s.fixes_path(), dir.path().join("operators").join("fixes.db"));
    assert_eq!(s.workers, 2);
}

#[test]
fn missing_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Settings::load(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn root_override_keeps_other_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("carelink.toml");
    fs::write(&path, "root = \"/srv/a\"\ncollection_file = \"enc.db\"\n").unwrap();

    let s = Settings::load(&path).unwrap().with_root("/srv/b");
    assert_eq!(s.root.to_str(), Some("/srv/b"));
    assert_eq!(s.collection_file, "enc.db");
}
