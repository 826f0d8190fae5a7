//! Reference resolution: replacing identifier children with entries

use std::collections::HashMap;

use pvsnap_core_types::EntryId;

use crate::client::Client;
use crate::errors::Result;
use crate::model::{Child, Entry};
use crate::store::EntryStore;
use crate::{log_op_end, log_op_error, log_op_start};

/// State for one resolution pass
///
/// Identifiers met more than once in a pass are fetched once. An identifier
/// naming an entry on the current path is left unresolved.
struct Pass<'a> {
    store: &'a dyn EntryStore,
    seen: HashMap<EntryId, Entry>,
    ancestors: Vec<EntryId>,
    resolved: usize,
}

impl<'a> Pass<'a> {
    fn new(store: &'a dyn EntryStore) -> Self {
        Self {
            store,
            seen: HashMap::new(),
            ancestors: Vec::new(),
            resolved: 0,
        }
    }

    fn fetch(&mut self, id: EntryId) -> Result<Entry> {
        self.resolved += 1;
        if let Some(entry) = self.seen.get(&id) {
            return Ok(entry.clone());
        }
        let entry = self.store.get_entry(id)?;
        self.seen.insert(id, entry.clone());
        Ok(entry)
    }

    /// Resolve `depth` levels below `entry`; `None` is unbounded
    fn fill_entry(&mut self, entry: &mut Entry, depth: Option<usize>) -> Result<()> {
        if depth == Some(0) {
            return Ok(());
        }
        let next = depth.map(|d| d - 1);
        let id = entry.id();
        let Some(nestable) = entry.as_nestable_mut() else {
            return Ok(());
        };
        self.ancestors.push(id);
        let result = self.fill_children(nestable.children_mut(), next);
        self.ancestors.pop();
        result
    }

    fn fill_children(&mut self, children: &mut [Child], depth: Option<usize>) -> Result<()> {
        for child in children.iter_mut() {
            if let Child::Unresolved(id) = child {
                if self.ancestors.contains(id) {
                    tracing::warn!(entry_id = %id, "reference cycle, leaving identifier unresolved");
                    continue;
                }
                let fetched = self.fetch(*id)?;
                *child = Child::Resolved(fetched);
            }
            if let Child::Resolved(inner) = child {
                self.fill_entry(inner, depth)?;
            }
        }
        Ok(())
    }
}

impl Client {
    /// Replace identifier children with entries from the store, in place
    ///
    /// `fill_depth` counts levels below `entry`: `Some(1)` resolves only its
    /// direct children, `Some(0)` does nothing, `None` resolves until no
    /// identifiers remain. Leaf entries are left untouched. Filling a graph
    /// without identifiers makes no store calls.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` when an identifier is missing from the store.
    /// Slots resolved before the failure stay resolved.
    pub fn fill(&self, entry: &mut Entry, fill_depth: Option<usize>) -> Result<()> {
        log_op_start!("fill", entry_id = %entry.id());
        let start = std::time::Instant::now();

        let mut pass = Pass::new(self.store());
        pass.fill_entry(entry, fill_depth).map_err(|e| {
            log_op_error!(
                "fill",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "fill",
            duration_ms = start.elapsed().as_millis() as u64,
            resolved_count = pass.resolved
        );
        Ok(())
    }

    /// Like [`Client::fill`], materialising `child` itself first if needed
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` when an identifier is missing from the store.
    pub fn fill_child(&self, child: &mut Child, fill_depth: Option<usize>) -> Result<()> {
        if let Child::Unresolved(id) = child {
            let entry = self.store().get_entry(*id)?;
            *child = Child::Resolved(entry);
        }
        match child {
            Child::Resolved(entry) => self.fill(entry, fill_depth),
            Child::Unresolved(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control_layer::MemoryControlLayer;
    use crate::model::{Collection, Nestable, Parameter};
    use crate::store::MemoryStore;

    #[test]
    fn test_shared_identifier_fetched_once_per_pass() {
        let shared = Parameter::new("SHARED");
        let shared_id = shared.id;
        let store = MemoryStore::with_entries([shared.into()]);
        let client = Client::new(store, MemoryControlLayer::new());

        let mut entry: Entry = Collection::new("C")
            .with_child(shared_id)
            .with_child(shared_id)
            .into();
        let mut pass = Pass::new(client.store());
        pass.fill_entry(&mut entry, None).unwrap();

        assert_eq!(pass.resolved, 2);
        assert_eq!(pass.seen.len(), 1);
        assert!(!entry.as_nestable().unwrap().has_unresolved());
    }

    #[test]
    fn test_self_reference_left_unresolved() {
        let looping = Collection::new("loop");
        let id = looping.id;
        let looping = looping.with_child(id);
        let store = MemoryStore::with_entries([looping.clone().into()]);
        let client = Client::new(store, MemoryControlLayer::new());

        let mut entry: Entry = Collection::new("top").with_child(id).into();
        client.fill(&mut entry, None).unwrap();

        let inner = entry.as_nestable().unwrap().children()[0].entry().unwrap();
        assert_eq!(inner.id(), id);
        assert!(inner.as_nestable().unwrap().has_unresolved());
    }
}
