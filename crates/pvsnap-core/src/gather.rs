//! Leaf gathering: flattening an entry graph into its PV-carrying leaves

use std::collections::HashSet;

use pvsnap_core_types::EntryId;

use crate::client::Client;
use crate::errors::Result;
use crate::model::{Child, Entry, EpicsValue};
use crate::{log_op_end, log_op_error, log_op_start};

/// Work item for the traversal stack
enum Pending<'a> {
    Borrowed(&'a Entry),
    Owned(Entry),
    Id(EntryId),
}

impl<'a> Pending<'a> {
    fn from_child(child: &'a Child) -> Self {
        match child {
            Child::Resolved(entry) => Pending::Borrowed(entry),
            Child::Unresolved(id) => Pending::Id(*id),
        }
    }

    fn from_owned_child(child: Child) -> Self {
        match child {
            Child::Resolved(entry) => Pending::Owned(entry),
            Child::Unresolved(id) => Pending::Id(id),
        }
    }

    fn id(&self) -> EntryId {
        match self {
            Pending::Borrowed(entry) => entry.id(),
            Pending::Owned(entry) => entry.id(),
            Pending::Id(id) => *id,
        }
    }
}

/// The readback entry paired with a leaf, if any
fn paired_readback(leaf: &Entry) -> Option<Entry> {
    match leaf {
        Entry::Parameter(p) => p.readback.as_deref().cloned().map(Entry::Parameter),
        Entry::Setpoint(s) => s.readback.as_deref().cloned().map(Entry::Readback),
        _ => None,
    }
}

impl Client {
    /// Every leaf reachable from `root`, in pre-order
    ///
    /// Identifiers are fetched from the store as they are reached. Each
    /// identifier is visited once. A leaf's paired readback follows it
    /// directly.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` when an identifier is missing from the store.
    pub fn gather_leaves(&self, root: &Child) -> Result<Vec<Entry>> {
        log_op_start!("gather_leaves", entry_id = %root.id());
        let start = std::time::Instant::now();

        let leaves = self.gather_leaves_impl(Pending::from_child(root)).map_err(|e| {
            log_op_error!(
                "gather_leaves",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "gather_leaves",
            duration_ms = start.elapsed().as_millis() as u64,
            leaf_count = leaves.len()
        );
        Ok(leaves)
    }

    fn gather_leaves_impl(&self, root: Pending<'_>) -> Result<Vec<Entry>> {
        let mut leaves = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![root];

        while let Some(item) = stack.pop() {
            if !seen.insert(item.id()) {
                continue;
            }
            match item {
                Pending::Borrowed(entry) => match entry.as_nestable() {
                    Some(nestable) => {
                        stack.extend(nestable.children().iter().rev().map(Pending::from_child));
                    }
                    None => {
                        let readback = paired_readback(entry);
                        leaves.push(entry.clone());
                        stack.extend(readback.map(Pending::Owned));
                    }
                },
                Pending::Owned(entry) => self.push_owned(entry, &mut stack, &mut leaves),
                Pending::Id(id) => {
                    let entry = self.store().get_entry(id)?;
                    self.push_owned(entry, &mut stack, &mut leaves);
                }
            }
        }
        Ok(leaves)
    }

    fn push_owned(&self, entry: Entry, stack: &mut Vec<Pending<'_>>, leaves: &mut Vec<Entry>) {
        let children = match entry {
            Entry::Collection(c) => c.children,
            Entry::Snapshot(s) => s.children,
            leaf => {
                let readback = paired_readback(&leaf);
                leaves.push(leaf);
                stack.extend(readback.map(Pending::Owned));
                return;
            }
        };
        stack.extend(children.into_iter().rev().map(Pending::from_owned_child));
    }

    /// (PV name, value) pairs of the data-carrying leaves below `root`
    ///
    /// Parameters carry no data and are skipped. With `writable_only`,
    /// readbacks are skipped too, leaving only setpoints.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` when an identifier is missing from the store.
    pub fn gather_data(&self, root: &Child, writable_only: bool) -> Result<Vec<(String, EpicsValue)>> {
        Ok(data_pairs(self.gather_leaves(root)?, writable_only))
    }

    /// Writable (PV name, value) pairs below `entry`, without cloning it
    pub(crate) fn gather_writable(&self, entry: &Entry) -> Result<Vec<(String, EpicsValue)>> {
        let leaves = self.gather_leaves_impl(Pending::Borrowed(entry))?;
        Ok(data_pairs(leaves, true))
    }
}

fn data_pairs(leaves: Vec<Entry>, writable_only: bool) -> Vec<(String, EpicsValue)> {
    leaves
        .into_iter()
        .filter_map(|leaf| match leaf {
            Entry::Setpoint(s) => Some((s.pv_name, s.data)),
            Entry::Readback(r) if !writable_only => Some((r.pv_name, r.data)),
            _ => None,
        })
        .collect()
}
