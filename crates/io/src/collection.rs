//! The ordered document collection every operator store implements.

use carelink_core::Record;
use serde_json::{json, Value};

use crate::error::StoreError;

/// Store-assigned key, increasing in insertion order.
pub type DocKey = i64;

/// Key of the field that marks a document as a migration marker.
pub const MARKER_FIELD: &str = "migration_id";

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub key: DocKey,
    pub body: Value,
}

/// One operator's append-mostly document store.
///
/// Documents are returned in insertion order. Records and migration markers
/// share the collection.
pub trait Collection {
    fn find_all(&self) -> Result<Vec<Document>, StoreError>;

    fn insert(&mut self, body: &Value) -> Result<DocKey, StoreError>;

    fn update(&mut self, key: DocKey, body: &Value) -> Result<(), StoreError>;

    fn insert_record(&mut self, record: &Record) -> Result<DocKey, StoreError> {
        let body = serde_json::to_value(record).map_err(|e| StoreError::Invalid(e.to_string()))?;
        self.insert(&body)
    }
}

/// The migration id if `body` is a migration marker.
pub fn marker_id(body: &Value) -> Option<&str> {
    body.get(MARKER_FIELD)?.as_str()
}

pub fn marker(migration_id: &str) -> Value {
    json!({
        MARKER_FIELD: migration_id,
        "applied_at": chrono::Utc::now().to_rfc3339(),
    })
}

/// Decode every non-marker document into a [`Record`], in collection order.
pub fn decode_records(docs: &[Document]) -> Result<Vec<Record>, StoreError> {
    docs.iter()
        .filter(|d| marker_id(&d.body).is_none())
        .map(|d| {
            serde_json::from_value(d.body.clone()).map_err(|e| StoreError::Decode {
                key: d.key,
                message: e.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_are_not_records() {
        let docs = vec![
            Document {
                key: 1,
                body: json!({"record_id": "a", "kind": "encounter"}),
            },
            Document {
                key: 2,
                body: marker("0001-x"),
            },
        ];
        let records = decode_records(&docs).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].record_id, "a");
        assert_eq!(marker_id(&docs[1].body), Some("0001-x"));
    }

    #[test]
    fn undecodable_document_reports_key() {
        let docs = vec![Document {
            key: 9,
            body: json!({"kind": "encounter"}),
        }];
        match decode_records(&docs) {
            Err(StoreError::Decode { key, .. }) => assert_eq!(key, 9),
            other => panic!("expected decode error, got {other:?}"),
        }
    }
}
