//! Federated snapshot aggregation.
//!
//! Every operator keeps its own collection file under a shared root. The
//! aggregator never touches the live files: each one is copied into a scratch
//! directory, migrated there, decoded, and tagged with its owner. One broken
//! operator only costs that operator's records.

use std::ffi::OsString;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

use carelink_core::Record;
use serde::Serialize;

use crate::collection::{decode_records, Collection};
use crate::error::SnapshotError;
use crate::migrate::{apply_migrations, Migration};
use crate::migrations;
use crate::sqlite::SqliteCollection;

pub const DEFAULT_COLLECTION_FILE: &str = "records.db";
pub const DEFAULT_WORKERS: usize = 4;

#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Directory holding one subdirectory per operator.
    pub root: PathBuf,
    /// File name of the collection inside each operator directory.
    pub collection_file: String,
    /// Upper bound on concurrent snapshot workers. Zero is treated as one.
    pub workers: usize,
    /// Migrations run against every snapshot, in order.
    pub migrations: Vec<Migration>,
    /// Parent of the per-operator scratch directories. System temp dir when unset.
    pub scratch_dir: Option<PathBuf>,
}

impl AggregatorConfig {
    /// Defaults plus the built-in migrations.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            collection_file: DEFAULT_COLLECTION_FILE.to_string(),
            workers: DEFAULT_WORKERS,
            migrations: migrations::builtin(),
            scratch_dir: None,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_collection_file(mut self, name: impl Into<String>) -> Self {
        self.collection_file = name.into();
        self
    }

    pub fn with_migrations(mut self, migrations: Vec<Migration>) -> Self {
        self.migrations = migrations;
        self
    }

    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }
}

/// One operator whose records were left out of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperatorFailure {
    pub owner_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MergedDataset {
    /// Every discovered operator, sorted, including failed ones.
    pub operators: Vec<String>,
    /// Records in operator order, then collection order.
    pub records: Vec<Record>,
    pub failures: Vec<OperatorFailure>,
}

pub struct Aggregator {
    config: AggregatorConfig,
}

impl Aggregator {
    pub fn new(config: AggregatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Path of the live collection file for `owner_id`.
    pub fn collection_path(&self, owner_id: &str) -> PathBuf {
        self.config
            .root
            .join(owner_id)
            .join(&self.config.collection_file)
    }

    /// Operator ids under the root, sorted. A subdirectory without the
    /// collection file is not an operator.
    pub fn list_operators(&self) -> Result<Vec<String>, SnapshotError> {
        let root = &self.config.root;
        let root_err = |e: std::io::Error| SnapshotError::Root {
            path: root.display().to_string(),
            message: e.to_string(),
        };

        let mut owners = Vec::new();
        for entry in fs::read_dir(root).map_err(root_err)? {
            let entry = entry.map_err(root_err)?;
            let path = entry.path();
            if !path.is_dir() || !path.join(&self.config.collection_file).is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => owners.push(name),
                Err(name) => log::warn!("skipping operator directory with non-UTF-8 name {name:?}"),
            }
        }
        owners.sort();
        Ok(owners)
    }

    /// Snapshot, migrate and merge every operator's collection.
    pub fn aggregate(&self) -> Result<MergedDataset, SnapshotError> {
        let operators = self.list_operators()?;
        log::info!(
            "aggregating {} operator(s) under {}",
            operators.len(),
            self.config.root.display()
        );

        let mut slots: Vec<Option<Result<Vec<Record>, String>>> =
            operators.iter().map(|_| None).collect();

        if !operators.is_empty() {
            let workers = self.config.workers.clamp(1, operators.len());
            let next = AtomicUsize::new(0);
            let (tx, rx) = mpsc::channel();

            thread::scope(|s| {
                let handles: Vec<_> = (0..workers)
                    .map(|_| {
                        let tx = tx.clone();
                        let next = &next;
                        let operators = &operators;
                        s.spawn(move || loop {
                            let i = next.fetch_add(1, Ordering::Relaxed);
                            let Some(owner) = operators.get(i) else { break };
                            // A panic costs only the operator that caused it.
                            let result = panic::catch_unwind(AssertUnwindSafe(|| self.snapshot_operator(owner)))
                                .unwrap_or_else(|_| Err("snapshot panicked".to_string()));
                            if tx.send((i, result)).is_err() {
                                break;
                            }
                        })
                    })
                    .collect();
                drop(tx);

                for (i, result) in rx {
                    slots[i] = Some(result);
                }
                for handle in handles {
                    if handle.join().is_err() {
                        log::error!("snapshot worker panicked");
                    }
                }
            });
        }

        let mut dataset = MergedDataset::default();
        for (owner_id, slot) in operators.into_iter().zip(slots) {
            match slot.unwrap_or_else(|| Err("snapshot worker panicked".to_string())) {
                Ok(records) => {
                    log::debug!("operator {owner_id}: {} record(s)", records.len());
                    dataset.records.extend(records);
                }
                Err(reason) => {
                    log::warn!("operator {owner_id} skipped: {reason}");
                    dataset.failures.push(OperatorFailure {
                        owner_id: owner_id.clone(),
                        reason,
                    });
                }
            }
            dataset.operators.push(owner_id);
        }
        Ok(dataset)
    }

    /// Copy one operator's collection into a scratch directory and read it
    /// back migrated. The scratch directory is removed when this returns or
    /// unwinds.
    fn snapshot_operator(&self, owner_id: &str) -> Result<Vec<Record>, String> {
        let source = self.collection_path(owner_id);
        let mut builder = tempfile::Builder::new();
        builder.prefix("carelink-snapshot-");
        let scratch = match &self.config.scratch_dir {
            Some(parent) => builder.tempdir_in(parent),
            None => builder.tempdir(),
        }
        .map_err(|e| format!("cannot create scratch directory: {e}"))?;

        let copy = scratch.path().join(&self.config.collection_file);
        fs::copy(&source, &copy).map_err(|e| format!("cannot copy {}: {e}", source.display()))?;
        let wal = sidecar(&source, "-wal");
        if wal.is_file() {
            fs::copy(&wal, sidecar(&copy, "-wal"))
                .map_err(|e| format!("cannot copy {}: {e}", wal.display()))?;
        }

        let mut collection = SqliteCollection::open(&copy).map_err(|e| format!("cannot open snapshot: {e}"))?;
        let report = apply_migrations(&mut collection, &self.config.migrations).map_err(|e| e.to_string())?;
        if report.applied() > 0 {
            log::debug!("operator {owner_id}: {} migration(s) applied to snapshot", report.applied());
        }

        let docs = collection.find_all().map_err(|e| e.to_string())?;
        let records = decode_records(&docs).map_err(|e| e.to_string())?;
        Ok(records.into_iter().map(|r| r.with_owner(owner_id)).collect())
    }
}

/// `records.db` -> `records.db-wal`
fn sidecar(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sidecar_appends_to_file_name() {
        assert_eq!(
            sidecar(Path::new("/a/op/records.db"), "-wal"),
            PathBuf::from("/a/op/records.db-wal")
        );
    }

    #[test]
    fn missing_root_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let agg = Aggregator::new(AggregatorConfig::new(dir.path().join("nope")));
        assert!(matches!(agg.aggregate(), Err(SnapshotError::Root { .. })));
    }

    #[test]
    fn directories_without_collection_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("empty_op")).unwrap();
        fs::write(dir.path().join("fixes.db"), b"").unwrap();
        let agg = Aggregator::new(AggregatorConfig::new(dir.path()));
        assert!(agg.list_operators().unwrap().is_empty());
    }

    #[test]
    fn zero_workers_still_processes() {
        let dir = tempfile::tempdir().unwrap();
        let op = dir.path().join("op_a");
        fs::create_dir(&op).unwrap();
        SqliteCollection::open(&op.join(DEFAULT_COLLECTION_FILE)).unwrap();

        let agg = Aggregator::new(AggregatorConfig::new(dir.path()).with_workers(0));
        let merged = agg.aggregate().unwrap();
        assert_eq!(merged.operators, vec!["op_a"]);
        assert!(merged.failures.is_empty());
    }
}
