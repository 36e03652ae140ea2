//! Human-readable output. `--json` output bypasses this module entirely.

use std::fmt::Write as _;

use carelink_core::Fix;
use carelink_io::OperatorFailure;
use carelink_recon::{DerivedId, IdentifierMappings, PendingMatchGroup, ReconResult};
use serde::Serialize;

/// `carelink aggregate --json` payload.
#[derive(Debug, Serialize)]
pub struct AggregateReport<'a> {
    pub operators: &'a [String],
    pub failures: &'a [OperatorFailure],
    #[serde(flatten)]
    pub result: &'a ReconResult,
}

pub fn summary(result: &ReconResult, operators: &[String], failures: &[OperatorFailure]) -> String {
    let s = &result.summary;
    let mut out = String::new();

    let _ = write!(out, "operators:   {}", operators.len());
    if !failures.is_empty() {
        let _ = write!(out, " ({} skipped)", failures.len());
    }
    out.push('\n');
    let _ = writeln!(out, "records:     {} ({} patient)", s.total_records, s.patient_records);
    let _ = writeln!(
        out,
        "swedish:     {} missing, {} inferred, {} excluded",
        s.missing_swedish, s.inferred_swedish, s.excluded_swedish
    );
    let _ = writeln!(
        out,
        "providence:  {} missing, {} inferred, {} excluded",
        s.missing_providence, s.inferred_providence, s.excluded_providence
    );
    let _ = writeln!(out, "pending:     {} group(s)", s.pending_groups);
    for (kind, count) in &s.pending_by_type {
        let _ = writeln!(out, "  {kind:<38}{count}");
    }
    let _ = writeln!(out, "fixes:       {} applied", result.meta.fixes_applied);
    out
}

pub fn identifiers(mappings: &IdentifierMappings) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "providence -> swedish");
    for (key, value) in &mappings.providence_to_swedish {
        let _ = writeln!(out, "  {key:<20}{value}");
    }
    let _ = writeln!(out, "swedish -> providence");
    for (key, value) in &mappings.swedish_to_providence {
        let _ = writeln!(out, "  {key:<20}{value}");
    }
    out
}

pub fn pending(groups: &[PendingMatchGroup]) -> String {
    if groups.is_empty() {
        return "no pending matches\n".to_string();
    }
    let mut out = String::new();
    for group in groups {
        let _ = writeln!(out, "{}  {}", group.match_type, group.id);
        for r in &group.records {
            let _ = writeln!(
                out,
                "  {:<16}{:<28}{:<12}S {:<14}P {}",
                r.unique_id,
                r.subject_name.as_deref().unwrap_or("-"),
                r.date_of_birth.map(|d| d.to_string()).unwrap_or_else(|| "-".into()),
                id_cell(r.swedish.as_ref()),
                id_cell(r.providence.as_ref()),
            );
        }
    }
    out
}

/// `*` marks an inferred value.
fn id_cell(id: Option<&DerivedId>) -> String {
    match id {
        None => "-".to_string(),
        Some(d) if d.inferred => format!("{}*", d.value),
        Some(d) => d.value.to_string(),
    }
}

pub fn fixes(fixes: &[Fix]) -> String {
    if fixes.is_empty() {
        return "no fixes recorded\n".to_string();
    }
    let mut out = String::new();
    for fix in fixes {
        let _ = write!(out, "#{:<5}{:<20}", fix.seq, fix.unique_id);
        if let Some(v) = &fix.swedish_id {
            let _ = write!(out, " swedish={v}");
        }
        if let Some(v) = &fix.providence_id {
            let _ = write!(out, " providence={v}");
        }
        if let Some(v) = &fix.date_of_birth {
            let _ = write!(out, " dob={v}");
        }
        let _ = writeln!(out, "  ({})", fix.created_at.to_rfc3339());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use carelink_core::Record;

    fn patient(owner: &str, id: &str, name: &str, s: Option<&str>, p: Option<&str>) -> Record {
        Record::encounter(id)
            .with_owner(owner)
            .with_subject(name, "1980-02-01")
            .with_ids(s, p)
    }

    #[test]
    fn summary_lists_pending_types_and_skips() {
        let records = vec![
            patient("north", "1", "Jones, Tim", Some("s1"), None),
            patient("south", "9", "Tim Jones", Some("s2"), None),
        ];
        let result = carelink_recon::run(&records, &[]);
        let operators = vec!["north".to_string(), "south".to_string(), "west".to_string()];
        let failures = vec![OperatorFailure {
            owner_id: "west".into(),
            reason: "file is not a database".into(),
        }];

        let text = summary(&result, &operators, &failures);
        assert!(text.starts_with("operators:   3 (1 skipped)\n"));
        assert!(text.contains("records:     2 (2 patient)"));
        assert!(text.contains("same_person_different_identifiers"));
        assert!(text.contains("fixes:       0 applied"));
    }

    #[test]
    fn pending_marks_inferred_ids() {
        let records = vec![
            patient("north", "1", "Jones, Tim", Some("s1"), Some("p1")),
            patient("north", "2", "Jones, Tim", None, Some("p1")),
            patient("south", "9", "Tim Jones", Some("s2"), None),
        ];
        let result = carelink_recon::run(&records, &[]);
        let text = pending(&result.pending);
        assert!(text.contains("s1*"), "{text}");
        assert!(pending(&[]).contains("no pending"));
    }

    #[test]
    fn identifiers_show_excluded() {
        let records = vec![
            patient("a", "1", "Ann Lee", Some("s3"), Some("p3")),
            patient("a", "2", "Ann Lee", Some("s3"), Some("p4")),
        ];
        let text = identifiers(&carelink_recon::infer_identifiers(&records));
        assert!(text.contains("EXCLUDED"));
        assert!(text.lines().any(|l| l.trim_start().starts_with("s3")));
    }
}
