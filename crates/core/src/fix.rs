use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored manual correction. Fixes are append-only; for one `unique_id`
/// the fix with the highest `seq` wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    /// Insertion order within the fix store.
    pub seq: i64,
    pub unique_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swedish_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub providence_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A correction as submitted, before the store assigns `seq` and `created_at`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewFix {
    pub unique_id: String,
    #[serde(default)]
    pub swedish_id: Option<String>,
    #[serde(default)]
    pub providence_id: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
}

impl NewFix {
    pub fn new(unique_id: impl Into<String>) -> Self {
        Self {
            unique_id: unique_id.into(),
            ..Self::default()
        }
    }

    /// True when the fix would not change any field.
    pub fn is_empty(&self) -> bool {
        self.swedish_id.is_none() && self.providence_id.is_none() && self.date_of_birth.is_none()
    }
}
