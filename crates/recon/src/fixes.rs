use std::collections::HashMap;

use carelink_core::{Fix, Record};

/// Overlay the latest fix for each patient-bearing record.
///
/// Only fields the fix carries are replaced. Records of other kinds, and
/// records without a fix, are returned unchanged. Source records are never
/// modified.
pub fn apply_fixes(records: &[Record], fixes: &[Fix]) -> Vec<Record> {
    let mut latest: HashMap<&str, &Fix> = HashMap::new();
    for fix in fixes {
        let slot = latest.entry(fix.unique_id.as_str()).or_insert(fix);
        if fix.seq > slot.seq {
            *slot = fix;
        }
    }

    records
        .iter()
        .map(|record| {
            let mut out = record.clone();
            if !record.carries_patient() {
                return out;
            }
            if let Some(fix) = latest.get(record.unique_id().as_str()) {
                if let Some(v) = &fix.date_of_birth {
                    out.date_of_birth = Some(v.clone());
                }
                if let Some(v) = &fix.swedish_id {
                    out.swedish_id = Some(v.clone());
                }
                if let Some(v) = &fix.providence_id {
                    out.providence_id = Some(v.clone());
                }
            }
            out
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use carelink_core::RecordBody;
    use chrono::Utc;

    fn fix(seq: i64, unique_id: &str, swedish: Option<&str>, dob: Option<&str>) -> Fix {
        Fix {
            seq,
            unique_id: unique_id.into(),
            swedish_id: swedish.map(String::from),
            providence_id: None,
            date_of_birth: dob.map(String::from),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn latest_fix_wins_regardless_of_slice_order() {
        let records = vec![Record::encounter("1").with_owner("a").with_ids(Some("s0"), Some("p0"))];
        let fixes = vec![
            fix(3, "a-1", Some("s3"), None),
            fix(1, "a-1", Some("s1"), Some("1980-01-01")),
        ];
        let out = apply_fixes(&records, &fixes);
        assert_eq!(out[0].swedish_id.as_deref(), Some("s3"));
        // Fields absent from the winning fix keep their source value.
        assert_eq!(out[0].date_of_birth, None);
        assert_eq!(out[0].providence_id.as_deref(), Some("p0"));
        assert_eq!(records[0].swedish_id.as_deref(), Some("s0"));
    }

    #[test]
    fn non_patient_records_pass_through() {
        let note = Record::new("1", RecordBody::ShiftNote { note: "x".into() }).with_owner("a");
        let out = apply_fixes(&[note.clone()], &[fix(1, "a-1", Some("s1"), None)]);
        assert_eq!(out, vec![note]);
    }

    #[test]
    fn unrelated_fixes_are_ignored() {
        let r = Record::encounter("1").with_owner("a");
        let out = apply_fixes(&[r.clone()], &[fix(1, "b-1", Some("s1"), None)]);
        assert_eq!(out, vec![r]);
    }
}
