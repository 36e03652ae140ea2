//! Pending-match clustering: groups of records a human should look at.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

use carelink_core::{Mrn, Record};
use serde::Serialize;

use crate::derived::{derive_records, DerivedId, DerivedRecord};
use crate::identifiers::IdentifierGraph;
use crate::names::names_represent_same_person;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingMatchType {
    /// Likely one person recorded under different identifiers.
    SamePersonDifferentIdentifiers,
    /// One Swedish id shared by people who look different.
    SameSwedishIdDifferentPeople,
    /// One Providence id shared by people who look different.
    SameProvidenceIdDifferentPeople,
}

impl fmt::Display for PendingMatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SamePersonDifferentIdentifiers => write!(f, "same_person_different_identifiers"),
            Self::SameSwedishIdDifferentPeople => write!(f, "same_swedish_id_different_people"),
            Self::SameProvidenceIdDifferentPeople => write!(f, "same_providence_id_different_people"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PendingMatchGroup {
    /// Sorted member `unique_id`s joined by `|`, with `%` and `|` inside an
    /// id escaped so distinct member sets never share an id.
    pub id: String,
    #[serde(rename = "type")]
    pub match_type: PendingMatchType,
    pub records: Vec<DerivedRecord>,
}

impl PendingMatchGroup {
    fn new(match_type: PendingMatchType, members: &[&DerivedRecord]) -> Self {
        let ids: BTreeSet<&str> = members.iter().map(|r| r.unique_id.as_str()).collect();
        Self {
            id: ids.into_iter().map(escape_id).collect::<Vec<_>>().join(GROUP_ID_SEPARATOR),
            match_type,
            records: members.iter().map(|r| (*r).clone()).collect(),
        }
    }

    pub fn unique_ids(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.unique_id.as_str()).collect()
    }
}

const GROUP_ID_SEPARATOR: &str = "|";

fn escape_id(id: &str) -> String {
    id.replace('%', "%25").replace('|', "%7C")
}

/// Derive `records` with identifier inference and cluster them.
pub fn find_pending_matches(records: &[Record]) -> Vec<PendingMatchGroup> {
    let graph = IdentifierGraph::from_records(records);
    let derived = derive_records(records, &graph.mappings());
    cluster_pending(&derived, &graph)
}

/// Run all three passes over already derived records. `graph` must be built
/// from the same records.
pub fn cluster_pending(records: &[DerivedRecord], graph: &IdentifierGraph) -> Vec<PendingMatchGroup> {
    let patients: Vec<&DerivedRecord> = records.iter().filter(|r| r.carries_patient()).collect();
    let mut groups = Vec::new();

    // Pass 1: same date of birth, same-looking name, identifiers that disagree.
    let named: Vec<&DerivedRecord> = patients
        .iter()
        .copied()
        .filter(|r| r.subject_name.is_some())
        .collect();
    for (_, bucket) in bucket_by(&named, |r| r.date_of_birth) {
        for cluster in sweep_clusters(&bucket, same_name) {
            if identifiers_disagree(&cluster, graph) {
                groups.push(PendingMatchGroup::new(PendingMatchType::SamePersonDifferentIdentifiers, &cluster));
            }
        }
    }

    // Passes 2 and 3: one identifier, people who look different.
    let passes: [(PendingMatchType, fn(&DerivedRecord) -> Option<&Mrn>); 2] = [
        (PendingMatchType::SameSwedishIdDifferentPeople, DerivedRecord::swedish_mrn),
        (PendingMatchType::SameProvidenceIdDifferentPeople, DerivedRecord::providence_mrn),
    ];
    for (match_type, key) in passes {
        for (mrn, bucket) in bucket_by(&patients, |r| key(r).cloned()) {
            if mrn.is_excluded() {
                continue;
            }
            for cluster in sweep_clusters(&bucket, different_people) {
                groups.push(PendingMatchGroup::new(match_type, &cluster));
            }
        }
    }

    let mut seen = HashSet::new();
    groups.retain(|g| seen.insert(g.id.clone()));
    groups.sort_by_key(|g| g.match_type);
    log::debug!("{} pending match group(s)", groups.len());
    groups
}

/// Single-linkage sweep. The first unclustered record becomes the pivot and
/// collects every remaining record related to it; candidates are compared
/// with the pivot only, never with each other. Singletons are dropped.
pub fn sweep_clusters<'a, T: ?Sized>(
    bucket: &[&'a T],
    related: impl Fn(&T, &T) -> bool,
) -> Vec<Vec<&'a T>> {
    let mut remaining: Vec<&'a T> = bucket.to_vec();
    let mut clusters = Vec::new();
    while !remaining.is_empty() {
        let pivot = remaining.remove(0);
        let mut cluster = vec![pivot];
        remaining.retain(|candidate| {
            if related(pivot, *candidate) {
                cluster.push(*candidate);
                false
            } else {
                true
            }
        });
        if cluster.len() > 1 {
            clusters.push(cluster);
        }
    }
    clusters
}

/// Group by key in order of first appearance. Records without a key are left out.
fn bucket_by<'a, K: Eq + Hash + Clone>(
    records: &[&'a DerivedRecord],
    key: impl Fn(&DerivedRecord) -> Option<K>,
) -> Vec<(K, Vec<&'a DerivedRecord>)> {
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut buckets: Vec<(K, Vec<&'a DerivedRecord>)> = Vec::new();
    for &record in records {
        let Some(k) = key(record) else { continue };
        match index.get(&k) {
            Some(&i) => buckets[i].1.push(record),
            None => {
                index.insert(k.clone(), buckets.len());
                buckets.push((k, vec![record]));
            }
        }
    }
    buckets
}

fn same_name(a: &DerivedRecord, b: &DerivedRecord) -> bool {
    match (&a.subject_name, &b.subject_name) {
        (Some(x), Some(y)) => names_represent_same_person(x, y),
        _ => false,
    }
}

/// Known, different dates of birth or names that do not match. A missing
/// date or name is no evidence either way.
fn different_people(a: &DerivedRecord, b: &DerivedRecord) -> bool {
    let dob_differs = matches!((a.date_of_birth, b.date_of_birth), (Some(x), Some(y)) if x != y);
    let names_differ = a.subject_name.is_some() && b.subject_name.is_some() && !same_name(a, b);
    dob_differs || names_differ
}

/// Only the records' own identifiers count; inferred values would just echo
/// the graph back.
fn identifiers_disagree(cluster: &[&DerivedRecord], graph: &IdentifierGraph) -> bool {
    let swedish = own_ids(cluster, |r| r.swedish.as_ref());
    let providence = own_ids(cluster, |r| r.providence.as_ref());

    match (swedish.len(), providence.len()) {
        (s, p) if s > 1 || p > 1 => true,
        (1, 1) => match (swedish.first(), providence.first()) {
            (Some(s), Some(p)) => !graph.has_edge(s, p),
            _ => false,
        },
        _ => false,
    }
}

fn own_ids<'a>(
    cluster: &[&'a DerivedRecord],
    pick: impl Fn(&'a DerivedRecord) -> Option<&'a DerivedId>,
) -> BTreeSet<&'a str> {
    cluster
        .iter()
        .filter_map(|r| pick(*r))
        .filter(|d| !d.inferred)
        .filter_map(DerivedId::as_id)
        .collect()
}
