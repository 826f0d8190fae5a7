#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{harness, sample, sample_control};
use pvsnap_core::diff::{render_human_summary, DiffValue, PathSegment};
use pvsnap_core::model::{Child, Entry, EpicsValue, Readback, Setpoint, Snapshot};
use pvsnap_core::store::MemoryStore;
use pvsnap_core::ComparisonSession;

fn snapshot() -> Snapshot {
    Snapshot::new("S")
        .with_child(Setpoint::new("A", 1.0).with_readback(Readback::new("A:RBV", 0.98)))
        .with_child(Readback::new("B", 2_i64))
}

#[test]
fn test_identical_entries_have_no_differences() {
    let h = harness(MemoryStore::new(), sample_control());
    let s = Entry::from(snapshot());

    let diff = h.client.compare(s.clone(), s).unwrap();
    assert!(diff.is_empty());
}

#[test]
fn test_type_mismatch_is_single_record_with_empty_path() {
    let s = sample();
    let h = harness(s.store(), sample_control());

    let diff = h
        .client
        .compare(s.collection.clone().into(), snapshot().into())
        .unwrap();
    assert_eq!(diff.len(), 1);
    assert!(diff.diffs[0].path.is_empty());
    assert!(matches!(diff.diffs[0].original_value, DiffValue::Entry(_)));
    assert_eq!(h.store.call_count(), 0);
}

#[test]
fn test_changed_nested_value_reports_full_path() {
    let h = harness(MemoryStore::new(), sample_control());
    let original = snapshot();
    let mut changed = original.clone();
    if let Some(Entry::Setpoint(sp)) = changed.children[0].entry_mut() {
        if let Some(rb) = sp.readback.as_deref_mut() {
            rb.data = EpicsValue::Float(0.5);
        }
    }

    let diff = h.client.compare(original.into(), changed.into()).unwrap();
    assert_eq!(diff.len(), 1);
    assert_eq!(diff.diffs[0].path_string(), "children[0].readback.data");
    assert_eq!(diff.diffs[0].original_value, DiffValue::Value(EpicsValue::Float(0.98)));
    assert_eq!(diff.diffs[0].new_value, DiffValue::Value(EpicsValue::Float(0.5)));

    let prefix = [PathSegment::Field("children".to_string()), PathSegment::Index(0)];
    assert_eq!(diff.under(&prefix).count(), 1);
    assert!(render_human_summary(&diff).contains("1 difference"));
}

#[test]
fn test_compare_resolves_identifiers_before_diffing() {
    let sp = Setpoint::new("A", 1.0);
    let by_id = Snapshot::new("S").with_child(sp.id);
    let mut resolved = by_id.clone();
    resolved.children[0] = Child::from(sp.clone());
    let h = harness(MemoryStore::with_entries([sp.into()]), sample_control());

    let diff = h.client.compare(by_id.into(), resolved.into()).unwrap();
    assert!(diff.is_empty());
    assert_eq!(h.store.call_count(), 1);
}

#[test]
fn test_extra_child_reports_length() {
    let h = harness(MemoryStore::new(), sample_control());
    let original = snapshot();
    let longer = original.clone().with_child(Readback::new("C", 3.0));

    let diff = h.client.compare(original.into(), longer.into()).unwrap();
    let last = diff.diffs.last().unwrap();
    assert_eq!(last.path_string(), "children");
    assert_eq!(last.original_value, DiffValue::Length(2));
    assert_eq!(last.new_value, DiffValue::Length(3));
}

#[test]
fn test_session_runs_comparison_once_both_sides_chosen() {
    let h = harness(MemoryStore::new(), sample_control());
    let left = Entry::from(snapshot());
    let mut right = snapshot();
    right.title = "S2".to_string();

    let mut session = ComparisonSession::new();
    assert!(session.run(&h.client).unwrap().is_none());

    session.select(left);
    assert!(session.compare_with_selected(right.into()));
    let diff = session.run(&h.client).unwrap().expect("ready");
    assert!(diff.diffs.iter().any(|d| d.path_string() == "title"));
}
