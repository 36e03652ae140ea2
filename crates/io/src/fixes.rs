// Append-only log of manual identifier corrections

use std::path::Path;

use carelink_core::{Fix, NewFix};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use crate::error::StoreError;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS fixes (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    unique_id TEXT NOT NULL,
    swedish_id TEXT,
    providence_id TEXT,
    date_of_birth TEXT,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS fixes_unique_id ON fixes (unique_id);
"#;

const SELECT: &str =
    "SELECT seq, unique_id, swedish_id, providence_id, date_of_birth, created_at FROM fixes";

/// Fixes are never updated or deleted; a later fix for the same record
/// supersedes the earlier one when applied.
pub struct FixStore {
    conn: Connection,
}

impl FixStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Append a fix. Blank fields are dropped; a fix that would change
    /// nothing is rejected.
    pub fn record_fix(&mut self, fix: &NewFix) -> Result<Fix, StoreError> {
        let unique_id = fix.unique_id.trim();
        if unique_id.is_empty() {
            return Err(StoreError::Invalid("fix has no unique_id".into()));
        }
        let swedish_id = clean(&fix.swedish_id);
        let providence_id = clean(&fix.providence_id);
        let date_of_birth = clean(&fix.date_of_birth);
        if swedish_id.is_none() && providence_id.is_none() && date_of_birth.is_none() {
            return Err(StoreError::Invalid(format!("fix for {unique_id} changes nothing")));
        }

        let created_at = Utc::now();
        self.conn.execute(
            "INSERT INTO fixes (unique_id, swedish_id, providence_id, date_of_birth, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![unique_id, swedish_id, providence_id, date_of_birth, created_at.to_rfc3339()],
        )?;
        let seq = self.conn.last_insert_rowid();
        log::info!("recorded fix {seq} for {unique_id}");

        Ok(Fix {
            seq,
            unique_id: unique_id.to_string(),
            swedish_id,
            providence_id,
            date_of_birth,
            created_at,
        })
    }

    /// Every fix, oldest first.
    pub fn list_fixes(&self) -> Result<Vec<Fix>, StoreError> {
        let mut stmt = self.conn.prepare(&format!("{SELECT} ORDER BY seq"))?;
        let rows = stmt.query_map([], read_fix)?;
        rows.map(|r| r?).collect()
    }

    /// Fixes for one record, oldest first.
    pub fn history(&self, unique_id: &str) -> Result<Vec<Fix>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT} WHERE unique_id = ?1 ORDER BY seq"))?;
        let rows = stmt.query_map(params![unique_id], read_fix)?;
        rows.map(|r| r?).collect()
    }
}

fn clean(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn read_fix(row: &Row<'_>) -> rusqlite::Result<Result<Fix, StoreError>> {
    let seq: i64 = row.get(0)?;
    let stamp: String = row.get(5)?;
    let created_at = match DateTime::parse_from_rfc3339(&stamp) {
        Ok(t) => t.with_timezone(&Utc),
        Err(e) => {
            return Ok(Err(StoreError::Corrupt {
                key: seq,
                message: format!("bad created_at {stamp:?}: {e}"),
            }))
        }
    };
    Ok(Ok(Fix {
        seq,
        unique_id: row.get(1)?,
        swedish_id: row.get(2)?,
        providence_id: row.get(3)?,
        date_of_birth: row.get(4)?,
        created_at,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix(unique_id: &str, swedish: &str) -> NewFix {
        NewFix {
            swedish_id: Some(swedish.to_string()),
            ..NewFix::new(unique_id)
        }
    }

    #[test]
    fn fixes_are_listed_in_insertion_order() {
        let mut store = FixStore::in_memory().unwrap();
        let a = store.record_fix(&fix("op_a-1", "s1")).unwrap();
        let b = store.record_fix(&fix("op_b-2", "s2")).unwrap();
        let c = store.record_fix(&fix("op_a-1", "s3")).unwrap();
        assert!(a.seq < b.seq && b.seq < c.seq);

        let all = store.list_fixes().unwrap();
        assert_eq!(all, vec![a.clone(), b, c.clone()]);
        assert_eq!(store.history("op_a-1").unwrap(), vec![a, c]);
    }

    #[test]
    fn empty_fix_is_rejected() {
        let mut store = FixStore::in_memory().unwrap();
        let blank = NewFix {
            date_of_birth: Some("  ".into()),
            ..NewFix::new("op_a-1")
        };
        assert!(matches!(store.record_fix(&blank), Err(StoreError::Invalid(_))));
        assert!(matches!(store.record_fix(&fix(" ", "s1")), Err(StoreError::Invalid(_))));
        assert!(store.list_fixes().unwrap().is_empty());
    }

    #[test]
    fn fields_are_trimmed() {
        let mut store = FixStore::in_memory().unwrap();
        let f = store.record_fix(&fix(" op_a-1 ", " s1 ")).unwrap();
        assert_eq!(f.unique_id, "op_a-1");
        assert_eq!(f.swedish_id.as_deref(), Some("s1"));
        assert_eq!(f.providence_id, None);
    }

    #[test]
    fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixes.db");
        {
            let mut store = FixStore::open(&path).unwrap();
            store.record_fix(&fix("op_a-1", "s1")).unwrap();
        }
        let store = FixStore::open(&path).unwrap();
        assert_eq!(store.list_fixes().unwrap().len(), 1);
    }
}
