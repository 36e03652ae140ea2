use std::collections::BTreeMap;

use serde::Serialize;

use crate::derived::DerivedRecord;
use crate::identifiers::IdentifierMappings;
use crate::pending::PendingMatchGroup;

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub engine_version: String,
    pub run_at: String,
    /// Fixes that matched at least one record.
    pub fixes_applied: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconSummary {
    pub total_records: usize,
    /// Records whose kind carries patient identifiers.
    pub patient_records: usize,
    /// Patient records with no Swedish id of their own.
    pub missing_swedish: usize,
    pub missing_providence: usize,
    /// Missing ids filled from the inference tables with a concrete value.
    pub inferred_swedish: usize,
    pub inferred_providence: usize,
    /// Missing ids the inference tables deliberately left as `Excluded`.
    pub excluded_swedish: usize,
    pub excluded_providence: usize,
    pub pending_groups: usize,
    /// Keyed by pending match type name.
    pub pending_by_type: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub records: Vec<DerivedRecord>,
    pub mappings: IdentifierMappings,
    pub pending: Vec<PendingMatchGroup>,
}
