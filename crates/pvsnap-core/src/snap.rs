//! Snapshot acquisition
//!
//! One bulk read covers a whole collection, however deeply nested: gather the
//! parameters, read every primary, paired-readback and meta PV at once, then
//! rebuild the collection's shape from the pre-fetched values.

use std::collections::{HashMap, HashSet};

use pvsnap_core_types::EntryId;

use crate::client::Client;
use crate::errors::{Result, SnapError};
use crate::model::{
    Child, Collection, Entry, EntryKind, EpicsData, Parameter, Readback, Setpoint, Snapshot,
};
use crate::store::SearchTerm;
use crate::{log_op_end, log_op_error, log_op_start};

/// Pre-fetched PV values for one acquisition
type ValueMap = HashMap<String, EpicsData>;

/// Parameters reachable through collections, pre-order, each once
fn collect_parameters(entry: &Entry, seen: &mut HashSet<EntryId>, out: &mut Vec<Parameter>) {
    if !seen.insert(entry.id()) {
        return;
    }
    match entry {
        Entry::Parameter(p) => out.push(p.clone()),
        Entry::Collection(c) => {
            for child in c.children.iter().filter_map(Child::entry) {
                collect_parameters(child, seen, out);
            }
        }
        _ => {}
    }
}

/// Readback parameters not yet embedded in a captured setpoint
///
/// Keeps first-seen order; entries leave the pool once embedded.
#[derive(Default)]
struct ReadbackPool {
    pending: Vec<Parameter>,
}

impl ReadbackPool {
    fn from_parameters(params: &[Parameter]) -> Self {
        let mut seen = HashSet::new();
        let pending = params
            .iter()
            .filter_map(|p| p.readback.as_deref())
            .filter(|rb| seen.insert(rb.id))
            .cloned()
            .collect();
        Self { pending }
    }

    fn take(&mut self, id: EntryId) {
        self.pending.retain(|rb| rb.id != id);
    }
}

/// Combined read-target list, deduplicated by PV name in first-seen order
fn read_targets(params: &[Parameter], meta_pvs: &[Parameter]) -> Vec<String> {
    let primaries = params.iter().map(|p| p.pv_name.as_str());
    let readbacks = params
        .iter()
        .filter_map(|p| p.readback.as_deref())
        .map(|rb| rb.pv_name.as_str());
    let metas = meta_pvs.iter().map(|p| p.pv_name.as_str());

    let mut seen = HashSet::new();
    primaries
        .chain(readbacks)
        .chain(metas)
        .filter(|pv| seen.insert(*pv))
        .map(str::to_string)
        .collect()
}

fn reading(values: &ValueMap, pv_name: &str) -> EpicsData {
    values
        .get(pv_name)
        .cloned()
        .unwrap_or_else(EpicsData::placeholder)
}

/// Captured leaf for one parameter
fn capture_parameter(param: &Parameter, values: &ValueMap, pool: &mut ReadbackPool) -> Child {
    if param.read_only {
        return Readback::from_parameter(param, reading(values, &param.pv_name)).into();
    }
    let readback = param.readback.as_deref().map(|rb| {
        pool.take(rb.id);
        Readback::from_parameter(rb, reading(values, &rb.pv_name))
    });
    Setpoint::from_parameter(param, reading(values, &param.pv_name), readback).into()
}

/// Mirror a resolved collection into a snapshot
fn build_snapshot(coll: &Collection, values: &ValueMap, pool: &mut ReadbackPool) -> Snapshot {
    let mut snapshot = Snapshot::new(coll.title.clone());
    snapshot.tags = coll.tags.clone();
    snapshot.origin_collection = Some(Box::new(Child::Unresolved(coll.id)));

    for child in coll.children.iter().filter_map(Child::entry) {
        match child {
            Entry::Parameter(param) => {
                snapshot.children.push(capture_parameter(param, values, pool));
            }
            Entry::Collection(inner) => {
                snapshot.children.push(build_snapshot(inner, values, pool).into());
            }
            other => {
                tracing::debug!(entry_id = %other.id(), kind = %other.kind(), "skipping non-parameter leaf");
            }
        }
    }
    snapshot
}

impl Client {
    /// Capture live values for every parameter in `collection`
    ///
    /// The snapshot mirrors the collection: parameters become setpoints (or
    /// readbacks when read-only), nested collections become nested
    /// snapshots. Paired readbacks are embedded in their setpoints; any left
    /// over are appended as standalone readbacks, and meta PVs are recorded
    /// in `meta_pvs`, both on the top-level snapshot only.
    ///
    /// Exactly one bulk read is issued. PVs that cannot be read are recorded
    /// with [`EpicsData::placeholder`].
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` when an identifier in the collection is missing
    /// from the store.
    pub fn snap(&self, collection: &Collection) -> Result<Snapshot> {
        log_op_start!("snap", entry_id = %collection.id);
        let start = std::time::Instant::now();

        let (snapshot, pv_count) = self.snap_impl(collection).map_err(|e| {
            log_op_error!(
                "snap",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "snap",
            duration_ms = start.elapsed().as_millis() as u64,
            leaf_count = snapshot.leaf_count(),
            pv_count = pv_count
        );
        Ok(snapshot)
    }

    /// The snapshot plus the number of PVs read
    fn snap_impl(&self, collection: &Collection) -> Result<(Snapshot, usize)> {
        let mut resolved = Entry::Collection(collection.clone());
        self.fill(&mut resolved, None)?;

        let mut params = Vec::new();
        collect_parameters(&resolved, &mut HashSet::new(), &mut params);
        let Entry::Collection(resolved) = resolved else {
            return Err(SnapError::Internal {
                message: "fill changed the entry type".to_string(),
            });
        };

        let meta_pvs = self.store().get_meta_pvs();
        let targets = read_targets(&params, &meta_pvs);
        let values = self.read_all(&targets);
        let mut pool = ReadbackPool::from_parameters(&params);

        let mut snapshot = build_snapshot(&resolved, &values, &mut pool);
        finish_top_level(&mut snapshot, pool, &meta_pvs, &values);
        Ok((snapshot, targets.len()))
    }

    /// Capture live values for every parameter known to the store
    ///
    /// Flat form of [`Client::snap`]: one child per parameter, followed by
    /// leftover readbacks, and no origin collection.
    ///
    /// # Errors
    ///
    /// Propagates store search errors.
    pub fn snap_all(&self) -> Result<Snapshot> {
        log_op_start!("snap_all");
        let start = std::time::Instant::now();

        let (snapshot, pv_count) = self.snap_all_impl().map_err(|e| {
            log_op_error!(
                "snap_all",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "snap_all",
            duration_ms = start.elapsed().as_millis() as u64,
            leaf_count = snapshot.leaf_count(),
            pv_count = pv_count
        );
        Ok(snapshot)
    }

    fn snap_all_impl(&self) -> Result<(Snapshot, usize)> {
        let params: Vec<Parameter> = self
            .store()
            .search(&[SearchTerm::entry_type(EntryKind::Parameter)])?
            .into_iter()
            .filter_map(|entry| match entry {
                Entry::Parameter(p) => Some(p),
                _ => None,
            })
            .collect();

        let meta_pvs = self.store().get_meta_pvs();
        let targets = read_targets(&params, &meta_pvs);
        let values = self.read_all(&targets);
        let mut pool = ReadbackPool::from_parameters(&params);

        let mut snapshot = Snapshot::default();
        for param in &params {
            snapshot.children.push(capture_parameter(param, &values, &mut pool));
        }
        finish_top_level(&mut snapshot, pool, &meta_pvs, &values);
        Ok((snapshot, targets.len()))
    }

    /// The single bulk read behind an acquisition
    fn read_all(&self, targets: &[String]) -> ValueMap {
        tracing::debug!(pv_count = targets.len(), "reading snapshot targets");

        let results = self.control_layer().get_many(targets);
        let mut values = ValueMap::with_capacity(targets.len());
        let mut results = results.into_iter();
        for pv_name in targets {
            match results.next() {
                Some(Ok(data)) => {
                    values.insert(pv_name.clone(), data);
                }
                Some(Err(e)) => {
                    tracing::warn!(pv_name = %pv_name, error = %e, "PV unreadable, recording placeholder");
                }
                None => {
                    tracing::warn!(pv_name = %pv_name, "no value returned, recording placeholder");
                }
            }
        }
        values
    }
}

/// Append leftover readbacks and meta PVs to the top-level snapshot
fn finish_top_level(snapshot: &mut Snapshot, pool: ReadbackPool, meta_pvs: &[Parameter], values: &ValueMap) {
    for rb in pool.pending {
        let captured = Readback::from_parameter(&rb, reading(values, &rb.pv_name));
        snapshot.children.push(captured.into());
    }
    snapshot.meta_pvs = meta_pvs
        .iter()
        .map(|pv| Readback::from_parameter(pv, reading(values, &pv.pv_name)))
        .collect();
}
