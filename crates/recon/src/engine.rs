use std::collections::HashSet;

use carelink_core::{Fix, Record};

use crate::derived::derive_records;
use crate::evidence::compute_summary;
use crate::fixes::apply_fixes;
use crate::identifiers::IdentifierGraph;
use crate::model::{ReconMeta, ReconResult};
use crate::pending::cluster_pending;

/// Reconcile one aggregated dataset: overlay fixes, infer identifiers,
/// derive fields, cluster pending matches and summarize.
pub fn run(records: &[Record], fixes: &[Fix]) -> ReconResult {
    let fixed = apply_fixes(records, fixes);

    let graph = IdentifierGraph::from_records(&fixed);
    let mappings = graph.mappings();
    let derived = derive_records(&fixed, &mappings);
    let pending = cluster_pending(&derived, &graph);
    let summary = compute_summary(&derived, &pending);

    let known: HashSet<String> = records
        .iter()
        .filter(|r| r.carries_patient())
        .map(Record::unique_id)
        .collect();
    let fixes_applied = fixes
        .iter()
        .map(|f| f.unique_id.as_str())
        .collect::<HashSet<_>>()
        .into_iter()
        .filter(|id| known.contains(*id))
        .count();

    log::info!(
        "reconciled {} record(s): {} pending group(s), {} fixed record(s)",
        summary.total_records,
        summary.pending_groups,
        fixes_applied
    );

    ReconResult {
        meta: ReconMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            fixes_applied,
        },
        summary,
        records: derived,
        mappings,
        pending,
    }
}
