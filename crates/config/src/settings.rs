// Runtime settings
// Loaded from ~/.config/carelink/carelink.toml unless a path is given

use carelink_io::snapshot::{DEFAULT_COLLECTION_FILE, DEFAULT_WORKERS};
use carelink_io::AggregatorConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub const DEFAULT_FIXES_FILE: &str = "fixes.db";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Directory holding one subdirectory per operator.
    pub root: PathBuf,

    /// Collection file inside each operator directory.
    #[serde(default = "default_collection_file")]
    pub collection_file: String,

    /// Fix log. Relative paths resolve against `root`.
    #[serde(default = "default_fixes_file")]
    pub fixes_file: PathBuf,

    /// Concurrent snapshot workers.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Parent for snapshot scratch directories. System temp dir when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scratch_dir: Option<PathBuf>,
}

fn default_collection_file() -> String {
    DEFAULT_COLLECTION_FILE.to_string()
}

fn default_fixes_file() -> PathBuf {
    PathBuf::from(DEFAULT_FIXES_FILE)
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

impl Settings {
    /// Defaults for everything but the root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            collection_file: default_collection_file(),
            fixes_file: default_fixes_file(),
            workers: DEFAULT_WORKERS,
            scratch_dir: None,
        }
    }

    /// Get the settings file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("carelink")
            .join("carelink.toml")
    }

    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load from `path`. A relative `root` resolves against the file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let mut settings = Self::from_toml(&contents)?;
        if settings.root.is_relative() {
            if let Some(dir) = path.parent() {
                settings.root = dir.join(&settings.root);
            }
        }
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.root.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("root must not be empty".into()));
        }

        // Must be a bare file name
        let name = Path::new(&self.collection_file);
        if self.collection_file.is_empty() || name.file_name() != Some(name.as_os_str()) {
            return Err(ConfigError::Invalid(format!(
                "collection_file must be a file name, got '{}'",
                self.collection_file
            )));
        }

        if self.fixes_file.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("fixes_file must not be empty".into()));
        }

        if self.workers == 0 {
            return Err(ConfigError::Invalid("workers must be at least 1".into()));
        }
        Ok(())
    }

    /// Absolute (or root-relative) location of the fix log.
    pub fn fixes_path(&self) -> PathBuf {
        if self.fixes_file.is_absolute() {
            self.fixes_file.clone()
        } else {
            self.root.join(&self.fixes_file)
        }
    }

    /// Aggregator settings with the built-in migrations.
    pub fn aggregator_config(&self) -> AggregatorConfig {
        let config = AggregatorConfig::new(&self.root)
            .with_collection_file(self.collection_file.clone())
            .with_workers(self.workers);
        match &self.scratch_dir {
            Some(dir) => config.with_scratch_dir(dir),
            None => config,
        }
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }
}
