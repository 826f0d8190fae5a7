#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{harness, harness_with_config, sample, sample_control};
use pvsnap_core::config::ClientConfig;
use pvsnap_core::control_layer::MemoryControlLayer;
use pvsnap_core::model::{Entry, EpicsValue, Readback, Setpoint, Snapshot};
use pvsnap_core::store::MemoryStore;
use pvsnap_core::{ApplyMode, ApplyOutcome};

fn three_setpoints() -> Entry {
    Snapshot::new("restore me")
        .with_child(Setpoint::new("A", 1.0).with_readback(Readback::new("A:RBV", 0.9)))
        .with_child(Setpoint::new("B", 2.0))
        .with_child(Readback::new("R", 9.0))
        .with_child(Setpoint::new("C", 3.0))
        .into()
}

#[test]
fn test_sequential_halts_at_first_failure() {
    let control = MemoryControlLayer::new();
    control.set_put_failure("B", "write access denied");
    let h = harness(MemoryStore::new(), control);

    let outcome = h.client.apply(&three_setpoints(), ApplyMode::Sequential).unwrap();
    let ApplyOutcome::Halted { applied, failure } = &outcome else {
        panic!("expected halt, got {:?}", outcome);
    };
    assert_eq!(applied.len(), 1);
    assert_eq!(applied[0].pv_name, "A");
    assert_eq!(failure.pv_name, "B");
    assert!(failure.exception().is_some());

    let written: Vec<_> = h.control.put_log().into_iter().map(|(pv, _)| pv).collect();
    assert_eq!(written, vec!["A", "B"]);
    assert_eq!(h.control.value("C"), None);
    assert!(!outcome.is_success());
}

#[test]
fn test_bulk_issues_one_multi_write_of_setpoints_only() {
    let h = harness(MemoryStore::new(), MemoryControlLayer::new());

    let outcome = h.client.apply(&three_setpoints(), ApplyMode::Bulk).unwrap();
    assert!(outcome.is_success());
    assert_eq!(outcome.statuses().len(), 3);
    assert_eq!(h.control.put_many_count(), 1);
    assert_eq!(h.control.put_count(), 0);

    let written: Vec<_> = h.control.put_log().into_iter().map(|(pv, _)| pv).collect();
    assert_eq!(written, vec!["A", "B", "C"]);
    assert_eq!(h.control.value("C"), Some(EpicsValue::Float(3.0)));
}

#[test]
fn test_bulk_reports_per_target_failures() {
    let control = MemoryControlLayer::new();
    control.set_put_failure("B", "write access denied");
    let h = harness(MemoryStore::new(), control);

    let outcome = h.client.apply(&three_setpoints(), ApplyMode::Bulk).unwrap();
    let ApplyOutcome::Completed(statuses) = &outcome else {
        panic!("expected completion");
    };
    let failed: Vec<_> = statuses.iter().filter(|s| s.failed()).map(|s| s.pv_name.as_str()).collect();
    assert_eq!(failed, vec!["B"]);
    assert_eq!(h.control.value("C"), Some(EpicsValue::Float(3.0)));
}

#[test]
fn test_collection_is_rejected_without_io() {
    let s = sample();
    let h = harness(s.store(), sample_control());

    let outcome = h
        .client
        .apply(&Entry::from(s.collection.clone()), ApplyMode::Bulk)
        .unwrap();
    assert!(matches!(outcome, ApplyOutcome::Rejected { .. }));
    assert!(h.control.put_log().is_empty());
    assert_eq!(h.store.call_count(), 0);
}

#[test]
fn test_single_setpoint_is_one_put() {
    let h = harness(MemoryStore::new(), MemoryControlLayer::new());
    let entry = Entry::from(Setpoint::new("MTR:01", 4.2));

    let outcome = h.client.apply(&entry, ApplyMode::Bulk).unwrap();
    assert!(outcome.is_success());
    assert_eq!(h.control.put_count(), 1);
    assert_eq!(h.control.put_many_count(), 0);
}

#[test]
fn test_snapshot_children_by_identifier_are_fetched() {
    let sp = Setpoint::new("STORED", 6.0);
    let snapshot = Snapshot::new("s").with_child(sp.id);
    let h = harness(
        MemoryStore::with_entries([sp.into()]),
        MemoryControlLayer::new(),
    );

    h.client.apply(&snapshot.into(), ApplyMode::Bulk).unwrap();
    assert_eq!(h.control.value("STORED"), Some(EpicsValue::Float(6.0)));
}

#[test]
fn test_empty_snapshot_completes_without_writes() {
    let h = harness(MemoryStore::new(), MemoryControlLayer::new());
    let outcome = h
        .client
        .apply(&Snapshot::new("empty").into(), ApplyMode::Sequential)
        .unwrap();
    assert_eq!(outcome, ApplyOutcome::Completed(Vec::new()));
    assert!(h.control.put_log().is_empty());
}

#[test]
fn test_apply_default_follows_config() {
    let config = ClientConfig::from_toml_str("[apply]\nsequential = true\n").unwrap();
    let h = harness_with_config(MemoryStore::new(), MemoryControlLayer::new(), config);

    h.client.apply_default(&three_setpoints()).unwrap();
    assert_eq!(h.control.put_count(), 3);
    assert_eq!(h.control.put_many_count(), 0);
}
