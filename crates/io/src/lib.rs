// Operator stores: collections, migrations, snapshot aggregation, fix log

pub mod collection;
pub mod error;
pub mod fixes;
pub mod memory;
pub mod migrate;
pub mod migrations;
pub mod snapshot;
pub mod sqlite;

pub use collection::{Collection, DocKey, Document};
pub use error::{MigrationError, SnapshotError, StoreError};
pub use fixes::FixStore;
pub use memory::MemoryCollection;
pub use migrate::{apply_migrations, Migration, MigrationOutcome, MigrationReport};
pub use snapshot::{Aggregator, AggregatorConfig, MergedDataset, OperatorFailure};
pub use sqlite::SqliteCollection;

/// On-disk collection format version, stored in SQLite `user_version`.
/// Increment when the table layout changes in a way old readers can't handle.
pub const COLLECTION_FORMAT_VERSION: u32 = 1;
