use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::mrn::normalize_identifier;

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// One operator-owned document.
///
/// `owner_id` is empty while the record lives in its operator's store; the
/// aggregator stamps it when merging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub owner_id: String,
    pub record_id: String,
    #[serde(flatten)]
    pub body: RecordBody,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swedish_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub providence_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_name: Option<String>,
    /// Free text as entered; parsed by the derivation layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Kind-specific payload, tagged by `"kind"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordBody {
    Encounter {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        location: Option<String>,
        #[serde(default)]
        interventions: BTreeMap<String, bool>,
    },
    FollowUp {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        outcome: Option<String>,
    },
    ShiftNote {
        #[serde(default)]
        note: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Encounter,
    FollowUp,
    ShiftNote,
}

impl RecordKind {
    /// Whether records of this kind describe a patient and carry identifiers.
    pub fn carries_patient(self) -> bool {
        !matches!(self, Self::ShiftNote)
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encounter => write!(f, "encounter"),
            Self::FollowUp => write!(f, "follow_up"),
            Self::ShiftNote => write!(f, "shift_note"),
        }
    }
}

impl RecordBody {
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Encounter { .. } => RecordKind::Encounter,
            Self::FollowUp { .. } => RecordKind::FollowUp,
            Self::ShiftNote { .. } => RecordKind::ShiftNote,
        }
    }

    /// Number of interventions flagged `true`. Zero for non-encounters.
    pub fn intervention_count(&self) -> usize {
        match self {
            Self::Encounter { interventions, .. } => interventions.values().filter(|v| **v).count(),
            _ => 0,
        }
    }
}

impl Record {
    pub fn new(record_id: impl Into<String>, body: RecordBody) -> Self {
        Self {
            owner_id: String::new(),
            record_id: record_id.into(),
            body,
            swedish_id: None,
            providence_id: None,
            subject_name: None,
            date_of_birth: None,
            event_date: None,
            created_at: None,
        }
    }

    /// An encounter with no location and no interventions.
    pub fn encounter(record_id: impl Into<String>) -> Self {
        Self::new(
            record_id,
            RecordBody::Encounter {
                location: None,
                interventions: BTreeMap::new(),
            },
        )
    }

    /// Global key: `owner_id-record_id`.
    pub fn unique_id(&self) -> String {
        format!("{}-{}", self.owner_id, self.record_id)
    }

    pub fn kind(&self) -> RecordKind {
        self.body.kind()
    }

    pub fn carries_patient(&self) -> bool {
        self.kind().carries_patient()
    }

    /// Normalized Swedish id; always `None` for kinds without a patient.
    pub fn swedish(&self) -> Option<&str> {
        if !self.carries_patient() {
            return None;
        }
        normalize_identifier(self.swedish_id.as_deref())
    }

    /// Normalized Providence id; always `None` for kinds without a patient.
    pub fn providence(&self) -> Option<&str> {
        if !self.carries_patient() {
            return None;
        }
        normalize_identifier(self.providence_id.as_deref())
    }

    pub fn with_owner(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = owner_id.into();
        self
    }

    pub fn with_ids(mut self, swedish: Option<&str>, providence: Option<&str>) -> Self {
        self.swedish_id = swedish.map(String::from);
        self.providence_id = providence.map(String::from);
        self
    }

    pub fn with_subject(mut self, name: &str, date_of_birth: &str) -> Self {
        self.subject_name = Some(name.to_string());
        self.date_of_birth = Some(date_of_birth.to_string());
        self
    }
}
