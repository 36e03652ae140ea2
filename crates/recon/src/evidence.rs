use std::collections::BTreeMap;

use crate::derived::{DerivedId, DerivedRecord};
use crate::model::ReconSummary;
use crate::pending::PendingMatchGroup;

/// Compute summary statistics from derived records and pending groups.
pub fn compute_summary(records: &[DerivedRecord], pending: &[PendingMatchGroup]) -> ReconSummary {
    let mut summary = ReconSummary {
        total_records: records.len(),
        pending_groups: pending.len(),
        ..ReconSummary::default()
    };

    for r in records.iter().filter(|r| r.carries_patient()) {
        summary.patient_records += 1;
        tally(
            r.swedish.as_ref(),
            &mut summary.missing_swedish,
            &mut summary.inferred_swedish,
            &mut summary.excluded_swedish,
        );
        tally(
            r.providence.as_ref(),
            &mut summary.missing_providence,
            &mut summary.inferred_providence,
            &mut summary.excluded_providence,
        );
    }

    let mut by_type: BTreeMap<String, usize> = BTreeMap::new();
    for g in pending {
        *by_type.entry(g.match_type.to_string()).or_insert(0) += 1;
    }
    summary.pending_by_type = by_type;
    summary
}

fn tally(id: Option<&DerivedId>, missing: &mut usize, inferred: &mut usize, excluded: &mut usize) {
    match id {
        Some(d) if !d.inferred => {}
        Some(d) => {
            *missing += 1;
            if d.value.is_excluded() {
                *excluded += 1;
            } else {
                *inferred += 1;
            }
        }
        None => *missing += 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derived::derive_records;
    use crate::identifiers::infer_identifiers;
    use carelink_core::{Record, RecordBody};

    #[test]
    fn counts_missing_inferred_and_excluded() {
        let records = vec![
            Record::encounter("1").with_owner("a").with_ids(Some("s1"), Some("p1")),
            Record::encounter("2").with_owner("a").with_ids(None, Some("p1")),
            Record::encounter("3").with_owner("a").with_ids(Some("s3"), Some("p3")),
            Record::encounter("4").with_owner("a").with_ids(Some("s3"), Some("p4")),
            Record::encounter("5").with_owner("a").with_ids(Some("s3"), None),
            Record::encounter("6").with_owner("a"),
            Record::new("7", RecordBody::ShiftNote { note: String::new() }).with_owner("a"),
        ];
        let derived = derive_records(&records, &infer_identifiers(&records));
        let s = compute_summary(&derived, &[]);

        assert_eq!(s.total_records, 7);
        assert_eq!(s.patient_records, 6);
        assert_eq!((s.missing_swedish, s.inferred_swedish, s.excluded_swedish), (2, 1, 0));
        assert_eq!((s.missing_providence, s.inferred_providence, s.excluded_providence), (2, 0, 1));
        assert!(s.pending_by_type.is_empty());
    }
}
