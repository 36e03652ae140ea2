// Property-based tests for identifier inference, name matching and clustering.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::{BTreeMap, HashSet};

use carelink_core::Record;
use carelink_recon::names::set_similarity;
use carelink_recon::{find_pending_matches, infer_identifiers, names_represent_same_person};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

fn config_64() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(64),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Small identifier alphabets so collisions and ambiguity are common.
fn arb_id(prefix: &'static str) -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        3 => (0..6u8).prop_map(move |n| Some(format!("{prefix}{n}"))),
        1 => Just(None),
        1 => Just(Some("  ".to_string())),
    ]
}

fn arb_records(max: usize) -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec((arb_id("s"), arb_id("p"), arb_name(), arb_dob()), 0..max).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (s, p, name, dob))| {
                let mut r = Record::encounter(i.to_string())
                    .with_owner("op")
                    .with_ids(s.as_deref(), p.as_deref());
                r.subject_name = name;
                r.date_of_birth = dob;
                r
            })
            .collect()
    })
}

fn arb_name() -> impl Strategy<Value = Option<String>> {
    let first = prop::sample::select(vec![
        "Tim", "Timothy", "Tom", "Bill", "William", "Jon", "John", "Ann", "Anne", "F", "Bud",
    ]);
    let middle = prop::sample::select(vec!["", "A", "Allen", "C", "Peter", "Lee"]);
    let last = prop::sample::select(vec![
        "Jones", "Jonas", "Smith", "Smyth", "Reinsch", "Smith-Jones", "SmithJones", "Müller",
    ]);
    prop_oneof![
        4 => (first.clone(), middle.clone(), last.clone()).prop_map(|(f, m, l)| {
            Some(if m.is_empty() { format!("{f} {l}") } else { format!("{f} {m} {l}") })
        }),
        2 => (first, middle, last).prop_map(|(f, m, l)| Some(format!("{l}, {f} {m}"))),
        1 => Just(None),
        1 => Just(Some(String::new())),
    ]
}

fn arb_dob() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        3 => prop::sample::select(vec!["1980-02-01", "02/01/1980", "19750730", "1990-01-01"])
            .prop_map(|s| Some(s.to_string())),
        1 => Just(None),
        1 => Just(Some("unknown".to_string())),
    ]
}

// ---------------------------------------------------------------------------
// Identifier inference
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn inference_is_injective(records in arb_records(30)) {
        let m = infer_identifiers(&records);
        for table in [&m.providence_to_swedish, &m.swedish_to_providence] {
            let mut seen: BTreeMap<&str, &str> = BTreeMap::new();
            for (key, value) in table.iter() {
                if let Some(v) = value.as_id() {
                    let previous = seen.insert(v, key.as_str());
                    prop_assert!(previous.is_none(), "{v} claimed by {previous:?} and {key}");
                }
            }
        }
    }

    #[test]
    fn inference_is_mutual(records in arb_records(30)) {
        let m = infer_identifiers(&records);
        for (p, s) in &m.providence_to_swedish {
            if let Some(s) = s.as_id() {
                prop_assert_eq!(m.providence_for(s).and_then(|v| v.as_id()), Some(p.as_str()));
            }
        }
    }

    #[test]
    fn inference_ignores_record_order(records in arb_records(20)) {
        let mut reversed = records.clone();
        reversed.reverse();
        prop_assert_eq!(infer_identifiers(&records), infer_identifiers(&reversed));
    }
}

// ---------------------------------------------------------------------------
// Names
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn name_matching_is_symmetric(a in arb_name(), b in arb_name()) {
        let a = a.unwrap_or_default();
        let b = b.unwrap_or_default();
        prop_assert_eq!(
            names_represent_same_person(&a, &b),
            names_represent_same_person(&b, &a)
        );
    }

    #[test]
    fn arbitrary_text_never_panics(a in "\\PC{0,40}", b in "\\PC{0,40}") {
        let ab = names_represent_same_person(&a, &b);
        prop_assert_eq!(ab, names_represent_same_person(&b, &a));
    }

    #[test]
    fn similarity_is_bounded(a in prop::collection::vec(0..5u8, 0..6), b in prop::collection::vec(0..5u8, 0..6)) {
        let sim = set_similarity(&a, &b);
        if a.is_empty() && b.is_empty() {
            prop_assert!(sim.is_nan());
        } else {
            prop_assert!((0.0..=1.0).contains(&sim));
        }
    }
}

// ---------------------------------------------------------------------------
// Clustering
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_64())]
    #[test]
    fn pending_groups_are_well_formed(records in arb_records(25)) {
        let groups = find_pending_matches(&records);
        let mut ids = HashSet::new();
        for g in &groups {
            prop_assert!(ids.insert(g.id.clone()), "duplicate group {}", g.id);
            prop_assert!(g.records.len() >= 2);
            let mut members: Vec<&str> = g.unique_ids();
            members.sort();
            prop_assert_eq!(&g.id, &members.join("|"));
        }
        let types: Vec<_> = groups.iter().map(|g| g.match_type).collect();
        let mut sorted = types.clone();
        sorted.sort();
        prop_assert_eq!(types, sorted);
    }

    #[test]
    fn clustering_is_deterministic(records in arb_records(25)) {
        let a: Vec<String> = find_pending_matches(&records).into_iter().map(|g| g.id).collect();
        let b: Vec<String> = find_pending_matches(&records).into_iter().map(|g| g.id).collect();
        prop_assert_eq!(a, b);
    }
}
