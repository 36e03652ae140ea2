//! Per-record derived fields consumed by reporting and linkage.

use carelink_core::{Mrn, Record, RecordKind};
use chrono::{DateTime, NaiveDate};
use serde::Serialize;

use crate::identifiers::IdentifierMappings;

/// An identifier as shown in derived output. `inferred` is set when the
/// record itself lacked it and the inference tables supplied it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivedId {
    pub value: Mrn,
    pub inferred: bool,
}

impl DerivedId {
    fn own(value: &str) -> Self {
        Self {
            value: Mrn::id(value),
            inferred: false,
        }
    }

    /// The concrete identifier, `None` when excluded.
    pub fn as_id(&self) -> Option<&str> {
        self.value.as_id()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DerivedRecord {
    pub unique_id: String,
    pub owner_id: String,
    pub record_id: String,
    pub kind: RecordKind,
    pub subject_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub event_date: Option<NaiveDate>,
    /// Whole years; `None` when either date is unknown or the event precedes birth.
    pub age_at_event: Option<u32>,
    pub intervention_count: usize,
    pub swedish: Option<DerivedId>,
    pub providence: Option<DerivedId>,
}

impl DerivedRecord {
    pub fn from_record(record: &Record, mappings: &IdentifierMappings) -> Self {
        let date_of_birth = record.date_of_birth.as_deref().and_then(parse_date);
        let event_date = record
            .event_date
            .as_deref()
            .and_then(parse_date)
            .or_else(|| record.created_at.map(|t| t.date_naive()));
        let age_at_event = match (date_of_birth, event_date) {
            (Some(dob), Some(at)) => at.years_since(dob),
            _ => None,
        };

        let swedish = record.swedish().map(DerivedId::own).or_else(|| {
            let p = record.providence()?;
            Some(DerivedId {
                value: mappings.swedish_for(p)?.clone(),
                inferred: true,
            })
        });
        let providence = record.providence().map(DerivedId::own).or_else(|| {
            let s = record.swedish()?;
            Some(DerivedId {
                value: mappings.providence_for(s)?.clone(),
                inferred: true,
            })
        });

        Self {
            unique_id: record.unique_id(),
            owner_id: record.owner_id.clone(),
            record_id: record.record_id.clone(),
            kind: record.kind(),
            subject_name: record.subject_name.clone(),
            date_of_birth,
            event_date,
            age_at_event,
            intervention_count: record.body.intervention_count(),
            swedish,
            providence,
        }
    }

    pub fn carries_patient(&self) -> bool {
        self.kind.carries_patient()
    }

    /// Swedish value used for bucketing: own or inferred, possibly `Excluded`.
    pub fn swedish_mrn(&self) -> Option<&Mrn> {
        self.swedish.as_ref().map(|d| &d.value)
    }

    pub fn providence_mrn(&self) -> Option<&Mrn> {
        self.providence.as_ref().map(|d| &d.value)
    }
}

pub fn derive_records(records: &[Record], mappings: &IdentifierMappings) -> Vec<DerivedRecord> {
    records
        .iter()
        .map(|r| DerivedRecord::from_record(r, mappings))
        .collect()
}

/// Parse a user-entered date. Accepts `YYYY-MM-DD`, `MM/DD/YYYY`, `YYYYMMDD`
/// and RFC 3339 timestamps; anything else is unknown.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
        let year = s[..4].parse().ok()?;
        let month = s[4..6].parse().ok()?;
        let day = s[6..].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%m/%d/%Y"))
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|t| t.date_naive()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifiers::infer_identifiers;
    use carelink_core::RecordBody;
    use std::collections::BTreeMap;

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn date_formats() {
        assert_eq!(parse_date("1980-02-01"), ymd(1980, 2, 1));
        assert_eq!(parse_date("02/01/1980"), ymd(1980, 2, 1));
        assert_eq!(parse_date("19800201"), ymd(1980, 2, 1));
        assert_eq!(parse_date(" 1980-02-01T08:30:00Z "), ymd(1980, 2, 1));
        assert_eq!(parse_date("1980-02-01T23:30:00-05:00"), ymd(1980, 2, 1));
    }

    #[test]
    fn unparsable_dates_are_unknown() {
        for raw in ["", "  ", "yesterday", "1980-13-01", "19801301", "01.02.1980", "1980"] {
            assert_eq!(parse_date(raw), None, "{raw:?}");
        }
    }

    #[test]
    fn age_in_whole_years() {
        let mut r = Record::encounter("1").with_subject("Jones, Tim", "1980-06-15");
        r.event_date = Some("2020-06-14".into());
        let d = DerivedRecord::from_record(&r, &IdentifierMappings::default());
        assert_eq!(d.age_at_event, Some(39));

        r.event_date = Some("1970-01-01".into());
        let d = DerivedRecord::from_record(&r, &IdentifierMappings::default());
        assert_eq!(d.age_at_event, None);
    }

    #[test]
    fn counts_only_flagged_interventions() {
        let r = Record::new(
            "1",
            RecordBody::Encounter {
                location: None,
                interventions: BTreeMap::from([("iv".to_string(), true), ("o2".to_string(), false)]),
            },
        );
        let d = DerivedRecord::from_record(&r, &IdentifierMappings::default());
        assert_eq!(d.intervention_count, 1);
    }

    #[test]
    fn missing_identifiers_are_inferred_and_flagged() {
        let records = vec![
            Record::encounter("1").with_owner("a").with_ids(Some("s1"), Some("p1")),
            Record::encounter("2").with_owner("a").with_ids(None, Some("p1")),
            Record::encounter("3").with_owner("a").with_ids(Some("s3"), Some("p3")),
            Record::encounter("4").with_owner("a").with_ids(Some("s3"), Some("p4")),
            Record::encounter("5").with_owner("a").with_ids(Some("s3"), None),
            Record::encounter("6").with_owner("a").with_ids(Some("s9"), None),
        ];
        let mappings = infer_identifiers(&records);
        let derived = derive_records(&records, &mappings);

        assert_eq!(derived[0].swedish, Some(DerivedId::own("s1")));
        assert_eq!(
            derived[1].swedish,
            Some(DerivedId {
                value: Mrn::id("s1"),
                inferred: true
            })
        );
        assert_eq!(derived[4].providence_mrn(), Some(&Mrn::Excluded));
        assert_eq!(derived[4].providence.as_ref().map(|d| d.inferred), Some(true));
        assert_eq!(derived[5].providence, None);
    }
}
