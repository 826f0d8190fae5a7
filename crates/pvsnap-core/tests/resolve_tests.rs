#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{harness, sample, sample_control};
use pvsnap_core::model::{Child, Collection, Entry, Nestable, Parameter};
use pvsnap_core::store::MemoryStore;
use pvsnap_core::{EntryId, SnapError};

fn children(entry: &Entry) -> &[Child] {
    entry.as_nestable().unwrap().children()
}

#[test]
fn test_fill_unbounded_resolves_every_identifier() {
    let s = sample();
    let h = harness(s.store(), sample_control());

    let mut entry = Entry::from(s.collection.clone());
    h.client.fill(&mut entry, None).unwrap();

    let kids = children(&entry);
    assert_eq!(kids.len(), 2);
    assert!(kids.iter().all(Child::is_resolved));
    assert_eq!(kids[0].entry().unwrap().pv_name(), Some("SIM:P1"));
    assert_eq!(kids[1].entry().unwrap().pv_name(), Some("SIM:P2"));
    assert_eq!(h.store.call_count(), 2);
}

#[test]
fn test_fill_is_idempotent_without_store_calls() {
    let s = sample();
    let h = harness(s.store(), sample_control());

    let mut entry = Entry::from(s.collection.clone());
    h.client.fill(&mut entry, None).unwrap();
    let calls = h.store.call_count();
    let once = entry.clone();

    h.client.fill(&mut entry, None).unwrap();
    assert_eq!(h.store.call_count(), calls);
    assert_eq!(entry, once);
}

#[test]
fn test_fill_depth_limits_levels() {
    let param = Parameter::new("DEEP:PV");
    let inner = Collection::new("inner").with_child(param.id);
    let outer = Collection::new("outer").with_child(inner.id);
    let store = MemoryStore::with_entries([param.clone().into(), inner.clone().into()]);
    let h = harness(store, sample_control());

    let mut zero = Entry::from(outer.clone());
    h.client.fill(&mut zero, Some(0)).unwrap();
    assert_eq!(h.store.call_count(), 0);
    assert!(!children(&zero)[0].is_resolved());

    let mut one = Entry::from(outer.clone());
    h.client.fill(&mut one, Some(1)).unwrap();
    let resolved_inner = children(&one)[0].entry().unwrap();
    assert_eq!(resolved_inner.title(), Some("inner"));
    assert!(!children(resolved_inner)[0].is_resolved());

    let mut all = Entry::from(outer);
    h.client.fill(&mut all, None).unwrap();
    let resolved_inner = children(&all)[0].entry().unwrap();
    assert_eq!(children(resolved_inner)[0].id(), param.id);
    assert!(children(resolved_inner)[0].is_resolved());
}

#[test]
fn test_fill_missing_identifier_is_not_found() {
    let missing = EntryId::new();
    let h = harness(MemoryStore::new(), sample_control());

    let mut entry = Entry::from(Collection::new("C").with_child(missing));
    let err = h.client.fill(&mut entry, None).unwrap_err();
    assert_eq!(err, SnapError::EntryNotFound { entry_id: missing });
}

#[test]
fn test_fill_leaves_leaf_untouched() {
    let h = harness(MemoryStore::new(), sample_control());
    let mut entry = Entry::from(Parameter::new("LEAF"));
    let before = entry.clone();

    h.client.fill(&mut entry, None).unwrap();
    assert_eq!(entry, before);
    assert_eq!(h.store.call_count(), 0);
}

#[test]
fn test_fill_child_materialises_identifier() {
    let s = sample();
    let h = harness(s.store(), sample_control());

    let mut child = Child::from(s.collection.id);
    h.client.fill_child(&mut child, None).unwrap();

    let entry = child.entry().unwrap();
    assert_eq!(entry.title(), Some("C"));
    assert!(!entry.as_nestable().unwrap().has_unresolved());
}
