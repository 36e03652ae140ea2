//! Marker-based schema migrations for one collection.
//!
//! Each migration runs at most once per collection: a marker document with
//! its id is inserted only after every matching document was processed. A
//! failure leaves no marker, so the next run starts that migration over.
//! Transforms must therefore be idempotent.

use serde::Serialize;
use serde_json::Value;

use crate::collection::{marker, marker_id, Collection};
use crate::error::MigrationError;

pub type Predicate = fn(&Value) -> bool;
pub type Transform = fn(&Value) -> Result<Value, String>;

#[derive(Clone, Copy)]
pub struct Migration {
    pub id: &'static str,
    /// Selects documents to transform. Should stop matching once transformed.
    pub predicate: Predicate,
    pub transform: Transform,
}

impl std::fmt::Debug for Migration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Migration").field("id", &self.id).finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum MigrationOutcome {
    /// Marker already present.
    Skipped,
    Applied { matched: usize, rewritten: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationStep {
    pub id: String,
    pub outcome: MigrationOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub steps: Vec<MigrationStep>,
}

impl MigrationReport {
    pub fn applied(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s.outcome, MigrationOutcome::Applied { .. }))
            .count()
    }
}

/// Run `migrations` in order against `collection`.
///
/// Stops at the first failing migration; migrations before it stay committed.
pub fn apply_migrations(
    collection: &mut dyn Collection,
    migrations: &[Migration],
) -> Result<MigrationReport, MigrationError> {
    let mut report = MigrationReport::default();
    for migration in migrations {
        let outcome = apply_one(collection, migration)?;
        report.steps.push(MigrationStep {
            id: migration.id.to_string(),
            outcome,
        });
    }
    Ok(report)
}

fn apply_one(
    collection: &mut dyn Collection,
    migration: &Migration,
) -> Result<MigrationOutcome, MigrationError> {
    let store_err = |source| MigrationError::Store {
        migration_id: migration.id.to_string(),
        source,
    };

    let docs = collection.find_all().map_err(store_err)?;
    if docs.iter().any(|d| marker_id(&d.body) == Some(migration.id)) {
        log::debug!("migration {} already applied", migration.id);
        return Ok(MigrationOutcome::Skipped);
    }

    let mut matched = 0;
    let mut rewritten = 0;
    for doc in docs.iter().filter(|d| marker_id(&d.body).is_none()) {
        if !(migration.predicate)(&doc.body) {
            continue;
        }
        matched += 1;

        let next = (migration.transform)(&doc.body).map_err(|message| MigrationError::Transform {
            migration_id: migration.id.to_string(),
            key: doc.key,
            message,
        })?;
        if next != doc.body {
            collection.update(doc.key, &next).map_err(store_err)?;
            rewritten += 1;
        }
    }

    collection.insert(&marker(migration.id)).map_err(store_err)?;
    log::info!(
        "migration {} applied: {matched} matched, {rewritten} rewritten",
        migration.id
    );
    Ok(MigrationOutcome::Applied { matched, rewritten })
}
