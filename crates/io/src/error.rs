use std::fmt;

use crate::collection::DocKey;

/// Failure of a single collection or fix-store operation.
#[derive(Debug)]
pub enum StoreError {
    /// SQLite error (open, query, write).
    Sqlite(String),
    /// Filesystem error.
    Io(String),
    /// A stored document body is not valid JSON.
    Corrupt { key: DocKey, message: String },
    /// A document is valid JSON but not a valid record.
    Decode { key: DocKey, message: String },
    /// Update targeted a document that does not exist.
    NotFound(DocKey),
    /// Rejected input (e.g. an empty fix).
    Invalid(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sqlite(msg) => write!(f, "sqlite error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
            Self::Corrupt { key, message } => {
                write!(f, "document {key}: corrupt body: {message}")
            }
            Self::Decode { key, message } => {
                write!(f, "document {key}: not a valid record: {message}")
            }
            Self::NotFound(key) => write!(f, "document {key} not found"),
            Self::Invalid(msg) => write!(f, "invalid input: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Sqlite(e.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

/// A migration aborted before its marker was written. The next run
/// reprocesses it from scratch.
#[derive(Debug)]
pub enum MigrationError {
    /// Reading or writing the collection failed.
    Store { migration_id: String, source: StoreError },
    /// The transform rejected a document.
    Transform { migration_id: String, key: DocKey, message: String },
}

impl MigrationError {
    pub fn migration_id(&self) -> &str {
        match self {
            Self::Store { migration_id, .. } | Self::Transform { migration_id, .. } => migration_id,
        }
    }
}

impl fmt::Display for MigrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store { migration_id, source } => {
                write!(f, "migration '{migration_id}' aborted: {source}")
            }
            Self::Transform { migration_id, key, message } => {
                write!(f, "migration '{migration_id}' aborted at document {key}: {message}")
            }
        }
    }
}

impl std::error::Error for MigrationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store { source, .. } => Some(source),
            Self::Transform { .. } => None,
        }
    }
}

/// Fatal aggregation failure. Per-operator problems are not errors; they are
/// reported as [`crate::OperatorFailure`]s.
#[derive(Debug)]
pub enum SnapshotError {
    /// The operator root cannot be enumerated at all.
    Root { path: String, message: String },
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root { path, message } => write!(f, "cannot list operators under {path}: {message}"),
        }
    }
}

impl std::error::Error for SnapshotError {}
