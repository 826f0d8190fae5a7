#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{harness, sample_control};
use pvsnap_core::model::{Entry, EntryKind, Readback};
use pvsnap_core::store::{MemoryStore, Predicate, SearchTerm};

fn readbacks() -> MemoryStore {
    MemoryStore::with_entries([
        Readback::new("T:1", 8.4).into(),
        Readback::new("T:2", 9.0).into(),
        Readback::new("T:3", 11.4).into(),
        Readback::new("T:4", 11.6).into(),
        Readback::new("LABEL", "idle").into(),
    ])
}

fn pv_names(found: &[Entry]) -> Vec<&str> {
    found.iter().filter_map(Entry::pv_name).collect()
}

#[test]
fn test_is_close_expands_into_range() {
    let h = harness(readbacks(), sample_control());

    // target 10, rel 0.1, abs 0.5 spans (8.5, 11.5)
    let found = h
        .client
        .search(&[SearchTerm::is_close("data", 10.0, 0.1, 0.5)])
        .unwrap();
    assert_eq!(pv_names(&found), vec!["T:2", "T:3"]);
    assert_eq!(h.store.search_count(), 1);
}

#[test]
fn test_terms_combine_conjunctively() {
    let h = harness(readbacks(), sample_control());

    let found = h
        .client
        .search(&[
            SearchTerm::entry_type(EntryKind::Readback),
            SearchTerm::new("data", Predicate::Gte(9.0.into())),
            SearchTerm::new("pv_name", Predicate::Lt("T:4".into())),
        ])
        .unwrap();
    assert_eq!(pv_names(&found), vec!["T:2", "T:3"]);
}

#[test]
fn test_text_values_never_match_numeric_predicates() {
    let h = harness(readbacks(), sample_control());

    let found = h
        .client
        .search(&[SearchTerm::new("data", Predicate::Gt(0.0.into()))])
        .unwrap();
    assert!(!pv_names(&found).contains(&"LABEL"));
    assert_eq!(found.len(), 4);
}

#[test]
fn test_find_origin_collection_of_snapshot() {
    let s = common::sample();
    let h = harness(s.store(), sample_control());

    let snapshot = h.client.snap(&s.collection).unwrap();
    let origin = h.client.find_origin_collection(&snapshot.into()).unwrap();
    assert_eq!(origin.id, s.collection.id);

    let err = h
        .client
        .find_origin_collection(&pvsnap_core::model::Snapshot::new("loose").into())
        .unwrap_err();
    assert!(matches!(err, pvsnap_core::SnapError::NoOriginCollection { .. }));
}
