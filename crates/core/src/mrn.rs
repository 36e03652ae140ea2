use std::fmt;

use serde::{Deserialize, Serialize};

/// A patient identifier value as it appears in derived or inferred output.
///
/// Absence is `Option::None` at the use site, so "absent", "excluded" and a
/// real identifier are three distinct states.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mrn {
    /// A concrete identifier.
    Id(String),
    /// Deliberately not inferred: the co-occurrence graph is ambiguous.
    Excluded,
}

impl Mrn {
    pub fn id(value: impl Into<String>) -> Self {
        Self::Id(value.into())
    }

    /// The concrete identifier, or `None` for `Excluded`.
    pub fn as_id(&self) -> Option<&str> {
        match self {
            Self::Id(v) => Some(v),
            Self::Excluded => None,
        }
    }

    pub fn is_excluded(&self) -> bool {
        matches!(self, Self::Excluded)
    }
}

impl fmt::Display for Mrn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(v) => write!(f, "{v}"),
            Self::Excluded => write!(f, "EXCLUDED"),
        }
    }
}

/// Trim a raw identifier; blank values count as absent.
pub fn normalize_identifier(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_identifiers_are_absent() {
        assert_eq!(normalize_identifier(None), None);
        assert_eq!(normalize_identifier(Some("")), None);
        assert_eq!(normalize_identifier(Some("   ")), None);
        assert_eq!(normalize_identifier(Some(" 0042 ")), Some("0042"));
    }

    #[test]
    fn excluded_has_no_id() {
        assert_eq!(Mrn::Excluded.as_id(), None);
        assert_eq!(Mrn::id("s1").as_id(), Some("s1"));
        assert_ne!(Mrn::id("EXCLUDED"), Mrn::Excluded);
    }

    #[test]
    fn serde_shape() {
        assert_eq!(serde_json::to_string(&Mrn::Excluded).unwrap(), "\"excluded\"");
        assert_eq!(serde_json::to_string(&Mrn::id("p1")).unwrap(), "{\"id\":\"p1\"}");
    }
}
