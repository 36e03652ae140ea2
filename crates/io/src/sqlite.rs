// Operator collection stored as a single SQLite file

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};
use serde_json::Value;

use crate::collection::{Collection, DocKey, Document};
use crate::error::StoreError;
use crate::COLLECTION_FORMAT_VERSION;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    body TEXT NOT NULL            -- one JSON object per document
);
"#;

pub struct SqliteCollection {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteCollection {
    /// Open (creating if missing) the collection at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        init(&conn)?;
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        init(&conn)?;
        Ok(Self { conn, path: None })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

fn init(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(SCHEMA)?;
    let version: u32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if version == 0 {
        conn.execute_batch(&format!("PRAGMA user_version = {COLLECTION_FORMAT_VERSION}"))?;
    } else if version > COLLECTION_FORMAT_VERSION {
        return Err(StoreError::Invalid(format!(
            "collection format version {version} is newer than supported {COLLECTION_FORMAT_VERSION}"
        )));
    }
    Ok(())
}

impl Collection for SqliteCollection {
    fn find_all(&self) -> Result<Vec<Document>, StoreError> {
        let mut stmt = self.conn.prepare("SELECT id, body FROM documents ORDER BY id")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?;

        let mut docs = Vec::new();
        for row in rows {
            let (key, text) = row?;
            let body: Value = serde_json::from_str(&text).map_err(|e| StoreError::Corrupt {
                key,
                message: e.to_string(),
            })?;
            docs.push(Document { key, body });
        }
        Ok(docs)
    }

    fn insert(&mut self, body: &Value) -> Result<DocKey, StoreError> {
        self.conn
            .execute("INSERT INTO documents (body) VALUES (?1)", params![body.to_string()])?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update(&mut self, key: DocKey, body: &Value) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            "UPDATE documents SET body = ?1 WHERE id = ?2",
            params![body.to_string(), key],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(key));
        }
        Ok(())
    }
}
