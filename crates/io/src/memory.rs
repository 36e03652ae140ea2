//! In-memory [`Collection`], used by tests and by callers that already hold
//! documents in memory.
//!
//! Supports a write budget so tests can simulate a process dying part-way
//! through a migration.

use serde_json::Value;

use crate::collection::{Collection, DocKey, Document};
use crate::error::StoreError;

#[derive(Debug, Clone, Default)]
pub struct MemoryCollection {
    docs: Vec<Document>,
    next_key: DocKey,
    write_budget: Option<usize>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from raw document bodies, keyed in order.
    pub fn from_bodies(bodies: impl IntoIterator<Item = Value>) -> Self {
        let mut c = Self::new();
        for body in bodies {
            c.push(body);
        }
        c
    }

    /// Allow only `writes` more inserts/updates; later writes fail.
    /// `None` removes the limit.
    pub fn set_write_budget(&mut self, writes: Option<usize>) {
        self.write_budget = writes;
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    fn push(&mut self, body: Value) -> DocKey {
        self.next_key += 1;
        self.docs.push(Document {
            key: self.next_key,
            body,
        });
        self.next_key
    }

    fn spend_write(&mut self) -> Result<(), StoreError> {
        match self.write_budget {
            Some(0) => Err(StoreError::Io("write budget exhausted".into())),
            Some(ref mut left) => {
                *left -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl Collection for MemoryCollection {
    fn find_all(&self) -> Result<Vec<Document>, StoreError> {
        Ok(self.docs.clone())
    }

    fn insert(&mut self, body: &Value) -> Result<DocKey, StoreError> {
        self.spend_write()?;
        Ok(self.push(body.clone()))
    }

    fn update(&mut self, key: DocKey, body: &Value) -> Result<(), StoreError> {
        self.spend_write()?;
        let doc = self
            .docs
            .iter_mut()
            .find(|d| d.key == key)
            .ok_or(StoreError::NotFound(key))?;
        doc.body = body.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn write_budget_blocks_further_writes() {
        let mut c = MemoryCollection::from_bodies([json!({"a": 1})]);
        c.set_write_budget(Some(1));
        c.update(1, &json!({"a": 2})).unwrap();
        assert!(c.insert(&json!({"b": 1})).is_err());
        assert_eq!(c.len(), 1);

        c.set_write_budget(None);
        c.insert(&json!({"b": 1})).unwrap();
        assert_eq!(c.len(), 2);
    }
}
