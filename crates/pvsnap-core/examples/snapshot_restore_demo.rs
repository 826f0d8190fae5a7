//! Snapshot and Restore Demonstration
//!
//! Walks through one save/restore cycle against the in-memory store and
//! control layer.
#![allow(clippy::unwrap_used, clippy::expect_used)]
//!
//! Key concepts illustrated:
//! 1. Collections referencing parameters by identifier
//! 2. Snapshot acquisition with one bulk read
//! 3. Comparing two snapshots
//! 4. Sequential apply halting on a failed write

use pvsnap_core::control_layer::MemoryControlLayer;
use pvsnap_core::diff::render_human_summary;
use pvsnap_core::logging_facility::{init, Profile};
use pvsnap_core::model::{Collection, Entry, EpicsValue, Parameter};
use pvsnap_core::store::MemoryStore;
use pvsnap_core::{ApplyMode, ApplyOutcome, Client, ComparisonSession};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init(Profile::Development);
    println!("=== pvsnap Snapshot/Restore Demo ===\n");

    // ===== Part 1: Build a collection =====
    println!("## Part 1: Collection\n");

    let gap_rbv = Parameter::new("ID:GAP:RBV").read_only(true);
    let gap = Parameter::new("ID:GAP")
        .with_description("Undulator gap")
        .with_readback(gap_rbv)
        .with_tolerances(Some(0.01), None);
    let ring_current = Parameter::new("RING:CURRENT").read_only(true);
    let collection = Collection::new("Beamline optics")
        .with_child(gap.id)
        .with_child(ring_current.id);

    let store = MemoryStore::with_entries([
        gap.into(),
        ring_current.into(),
        collection.clone().into(),
    ])
    .with_meta_pvs(vec![Parameter::new("RING:ENERGY")]);

    let control = MemoryControlLayer::new()
        .with_value("ID:GAP", 12.5)
        .with_value("ID:GAP:RBV", 12.49)
        .with_value("RING:CURRENT", 401.7)
        .with_value("RING:ENERGY", 3.0);
    control.set_put_failure("ID:GAP", "interlock active");

    let client = Client::new(store, control);
    println!("✓ Stored '{}' with {} children\n", collection.title, collection.children.len());

    // ===== Part 2: Snapshot =====
    println!("## Part 2: Snapshot\n");

    let first = client.snap(&collection)?;
    println!("✓ Captured {} leaves", first.leaf_count());
    let second = client.snap(&collection)?;
    println!("✓ Captured a second snapshot\n");

    // ===== Part 3: Compare =====
    println!("## Part 3: Compare\n");

    let mut session = ComparisonSession::new();
    session.select(Entry::from(first.clone()));
    session.compare_with_selected(Entry::from(second));
    if let Some(diff) = session.run(&client)? {
        println!("{}", render_human_summary(&diff));
    }

    // ===== Part 4: Restore =====
    println!("## Part 4: Restore\n");

    match client.apply(&Entry::from(first), ApplyMode::Sequential)? {
        ApplyOutcome::Halted { applied, failure } => {
            println!("✗ Halted after {} writes at {}", applied.len(), failure.pv_name);
            if let Some(err) = failure.exception() {
                println!("  reason: {}", err);
            }
        }
        ApplyOutcome::Completed(statuses) => {
            println!("✓ Wrote {} values", statuses.len());
        }
        ApplyOutcome::Rejected { reason } => println!("✗ Rejected: {}", reason),
    }

    let current = client.control_layer().get("ID:GAP")?;
    assert_eq!(current.data, EpicsValue::Float(12.5));

    println!("\n=== Demo Complete ===");
    Ok(())
}
