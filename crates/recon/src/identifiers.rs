use std::collections::{BTreeMap, BTreeSet};

use carelink_core::{Mrn, Record};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Co-occurrence graph
// ---------------------------------------------------------------------------

/// Bipartite graph of Swedish and Providence identifiers that appear together
/// on at least one record. Repeated pairs collapse into one edge.
#[derive(Debug, Clone, Default)]
pub struct IdentifierGraph {
    swedish: BTreeMap<String, BTreeSet<String>>,
    providence: BTreeMap<String, BTreeSet<String>>,
}

impl IdentifierGraph {
    pub fn from_records(records: &[Record]) -> Self {
        let mut graph = Self::default();
        for record in records {
            if let (Some(s), Some(p)) = (record.swedish(), record.providence()) {
                graph.add_edge(s, p);
            }
        }
        graph
    }

    fn add_edge(&mut self, swedish: &str, providence: &str) {
        self.swedish
            .entry(swedish.to_string())
            .or_default()
            .insert(providence.to_string());
        self.providence
            .entry(providence.to_string())
            .or_default()
            .insert(swedish.to_string());
    }

    /// Whether any record pairs these two identifiers.
    pub fn has_edge(&self, swedish: &str, providence: &str) -> bool {
        self.swedish
            .get(swedish)
            .is_some_and(|n| n.contains(providence))
    }

    pub fn edge_count(&self) -> usize {
        self.swedish.values().map(BTreeSet::len).sum()
    }

    /// Infer both directions. An identifier maps to its counterpart only when
    /// each is the other's sole neighbour; any ambiguity is `Excluded`.
    pub fn mappings(&self) -> IdentifierMappings {
        IdentifierMappings {
            providence_to_swedish: one_to_one(&self.providence, &self.swedish),
            swedish_to_providence: one_to_one(&self.swedish, &self.providence),
        }
    }
}

fn one_to_one(
    from: &BTreeMap<String, BTreeSet<String>>,
    to: &BTreeMap<String, BTreeSet<String>>,
) -> BTreeMap<String, Mrn> {
    from.iter()
        .map(|(x, neighbours)| {
            let sole = match neighbours.len() {
                1 => neighbours.iter().next(),
                _ => None,
            };
            let mrn = match sole {
                Some(y) if to.get(y).is_some_and(|back| back.len() == 1) => Mrn::id(y.clone()),
                _ => Mrn::Excluded,
            };
            (x.clone(), mrn)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Inference tables
// ---------------------------------------------------------------------------

/// Advisory lookup tables. Only identifiers that occur in some pairing are
/// keys; lookups for anything else return `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IdentifierMappings {
    pub providence_to_swedish: BTreeMap<String, Mrn>,
    pub swedish_to_providence: BTreeMap<String, Mrn>,
}

impl IdentifierMappings {
    pub fn swedish_for(&self, providence: &str) -> Option<&Mrn> {
        self.providence_to_swedish.get(providence)
    }

    pub fn providence_for(&self, swedish: &str) -> Option<&Mrn> {
        self.swedish_to_providence.get(swedish)
    }

    /// Keys mapped to `Excluded`, both directions.
    pub fn excluded_count(&self) -> usize {
        self.providence_to_swedish
            .values()
            .chain(self.swedish_to_providence.values())
            .filter(|m| m.is_excluded())
            .count()
    }
}

pub fn infer_identifiers(records: &[Record]) -> IdentifierMappings {
    let graph = IdentifierGraph::from_records(records);
    log::debug!("identifier graph: {} edge(s)", graph.edge_count());
    graph.mappings()
}

#[cfg(test)]
mod tests {
    use super::*;
    use carelink_core::RecordBody;

    fn rec(swedish: Option<&str>, providence: Option<&str>) -> Record {
        Record::encounter("r").with_ids(swedish, providence)
    }

    /// `{s1:[None,p1,None,None,None], s2:[p2], s3:[p3,p4], s5:[p5], s6:[p5]}`
    fn fixture() -> Vec<Record> {
        let mut records = vec![
            rec(Some("s1"), None),
            rec(Some("s1"), Some("p1")),
            rec(Some("s1"), None),
            rec(Some("s1"), None),
            rec(Some("s1"), None),
        ];
        records.extend([
            rec(Some("s2"), Some("p2")),
            rec(Some("s3"), Some("p3")),
            rec(Some("s3"), Some("p4")),
            rec(Some("s5"), Some("p5")),
            rec(Some("s6"), Some("p5")),
        ]);
        records
    }

    fn table(pairs: &[(&str, Option<&str>)]) -> BTreeMap<String, Mrn> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.map_or(Mrn::Excluded, Mrn::id)))
            .collect()
    }

    #[test]
    fn reference_fixture() {
        let m = infer_identifiers(&fixture());
        assert_eq!(
            m.providence_to_swedish,
            table(&[
                ("p1", Some("s1")),
                ("p2", Some("s2")),
                ("p3", None),
                ("p4", None),
                ("p5", None),
            ])
        );
        assert_eq!(
            m.swedish_to_providence,
            table(&[
                ("s1", Some("p1")),
                ("s2", Some("p2")),
                ("s3", None),
                ("s5", None),
                ("s6", None),
            ])
        );
        assert_eq!(m.excluded_count(), 6);
    }

    #[test]
    fn duplicate_pairs_collapse() {
        let records = vec![rec(Some("s1"), Some("p1")), rec(Some(" s1 "), Some("p1"))];
        let graph = IdentifierGraph::from_records(&records);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.has_edge("s1", "p1"));
        assert!(!graph.has_edge("p1", "s1"));
        assert_eq!(graph.mappings().swedish_for("p1"), Some(&Mrn::id("s1")));
    }

    #[test]
    fn unpaired_identifiers_are_not_keys() {
        let m = infer_identifiers(&[rec(Some("s1"), None), rec(None, Some("p1")), rec(Some(""), Some("p2"))]);
        assert!(m.providence_to_swedish.is_empty());
        assert!(m.swedish_to_providence.is_empty());
    }

    #[test]
    fn shift_notes_contribute_no_edges() {
        let note = Record::new("n", RecordBody::ShiftNote { note: String::new() })
            .with_ids(Some("s1"), Some("p1"));
        assert_eq!(IdentifierGraph::from_records(&[note]).edge_count(), 0);
    }
}
