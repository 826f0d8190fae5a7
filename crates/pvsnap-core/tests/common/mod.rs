use std::sync::Arc;

use pvsnap_core::config::ClientConfig;
use pvsnap_core::control_layer::MemoryControlLayer;
use pvsnap_core::model::{Collection, Entry, Parameter};
use pvsnap_core::store::MemoryStore;
use pvsnap_core::Client;

/// Client plus shared handles to its in-memory collaborators
///
/// The handles let tests inspect call counters after operations run.
#[allow(dead_code)]
pub struct Harness {
    pub client: Client,
    pub store: Arc<MemoryStore>,
    pub control: Arc<MemoryControlLayer>,
}

#[allow(dead_code)]
pub fn harness(store: MemoryStore, control: MemoryControlLayer) -> Harness {
    harness_with_config(store, control, ClientConfig::default())
}

#[allow(dead_code)]
pub fn harness_with_config(
    store: MemoryStore,
    control: MemoryControlLayer,
    config: ClientConfig,
) -> Harness {
    let store = Arc::new(store);
    let control = Arc::new(control);
    let client = Client::with_config(store.clone(), control.clone(), config);
    Harness {
        client,
        store,
        control,
    }
}

/// Collection C = [P1 (writable, readback R1), P2 (read-only)]
///
/// Children are stored as identifiers; the parameters live in the store.
#[allow(dead_code)]
pub struct Sample {
    pub collection: Collection,
    pub p1: Parameter,
    pub r1: Parameter,
    pub p2: Parameter,
}

#[allow(dead_code)]
pub fn sample() -> Sample {
    let r1 = Parameter::new("SIM:R1").read_only(true);
    let p1 = Parameter::new("SIM:P1").with_readback(r1.clone());
    let p2 = Parameter::new("SIM:P2").read_only(true);
    let collection = Collection::new("C").with_child(p1.id).with_child(p2.id);
    Sample {
        collection,
        p1,
        r1,
        p2,
    }
}

impl Sample {
    /// Store holding the parameters and the collection
    #[allow(dead_code)]
    pub fn store(&self) -> MemoryStore {
        MemoryStore::with_entries([
            Entry::from(self.p1.clone()),
            Entry::from(self.p2.clone()),
            Entry::from(self.collection.clone()),
        ])
    }
}

/// Live values P1 = 1.0, R1 = 0.99, P2 = 5
#[allow(dead_code)]
pub fn sample_control() -> MemoryControlLayer {
    MemoryControlLayer::new()
        .with_value("SIM:P1", 1.0)
        .with_value("SIM:R1", 0.99)
        .with_value("SIM:P2", 5_i64)
}
