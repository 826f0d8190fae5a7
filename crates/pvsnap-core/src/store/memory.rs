use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use pvsnap_core_types::EntryId;
use serde::Deserialize;

use super::{EntryStore, Predicate, SearchTerm};
use crate::errors::{Result, SnapError};
use crate::model::{Child, Entry, Parameter, Root, TagDef};

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<EntryId, Entry>,
    /// Insertion order of `entries`
    order: Vec<EntryId>,
    /// Explicitly saved collections and snapshots
    root: Vec<EntryId>,
    meta_pvs: Vec<Parameter>,
    tags: TagDef,
}

impl Inner {
    fn insert(&mut self, entry: Entry) {
        let id = entry.id();
        if self.entries.insert(id, entry).is_none() {
            self.order.push(id);
        }
    }

    /// Index `entry` and every resolved entry nested below it
    fn index(&mut self, entry: Entry) {
        let mut stack = vec![entry];
        while let Some(entry) = stack.pop() {
            if let Some(nestable) = entry.as_nestable() {
                stack.extend(nestable.children().iter().filter_map(Child::entry).cloned());
            }
            self.insert(entry);
        }
    }
}

/// On-disk fixture layout accepted by [`MemoryStore::from_json_str`]
#[derive(Debug, Default, Deserialize)]
struct Fixture {
    #[serde(default)]
    entries: Vec<Entry>,
    #[serde(default)]
    meta_pvs: Vec<Parameter>,
    #[serde(default)]
    tags: TagDef,
}

/// In-memory entry store
///
/// HashMap-based, guarded by a `RwLock` so it can sit behind the shared
/// `EntryStore` trait. Resolved entries nested inside a saved entry are
/// indexed too, so identifier lookup works for them.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
    get_calls: AtomicUsize,
    search_calls: AtomicUsize,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store from entries
    pub fn with_entries(entries: impl IntoIterator<Item = Entry>) -> Self {
        let mut inner = Inner::default();
        for entry in entries {
            if entry.as_nestable().is_some() {
                inner.root.push(entry.id());
            }
            inner.index(entry);
        }
        Self {
            inner: RwLock::new(inner),
            ..Self::default()
        }
    }

    pub fn with_meta_pvs(self, meta_pvs: Vec<Parameter>) -> Self {
        let mut inner = self.into_inner();
        inner.meta_pvs = meta_pvs;
        Self {
            inner: RwLock::new(inner),
            ..Self::default()
        }
    }

    pub fn with_tags(self, tags: TagDef) -> Self {
        let mut inner = self.into_inner();
        inner.tags = tags;
        Self {
            inner: RwLock::new(inner),
            ..Self::default()
        }
    }

    /// Build a store from a JSON document
    /// `{"entries": [...], "meta_pvs": [...], "tags": {...}}`
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if the document does not parse.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let fixture: Fixture = serde_json::from_str(json)?;
        Ok(Self::with_entries(fixture.entries)
            .with_meta_pvs(fixture.meta_pvs)
            .with_tags(fixture.tags))
    }

    /// Number of `get_entry` calls served so far
    pub fn call_count(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    /// Number of `search` calls served so far
    pub fn search_count(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.read().map(|inner| inner.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn into_inner(self) -> Inner {
        self.inner
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Inner>> {
        self.inner.read().map_err(|_| SnapError::Internal {
            message: "entry store lock poisoned".to_string(),
        })
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Inner>> {
        self.inner.write().map_err(|_| SnapError::Internal {
            message: "entry store lock poisoned".to_string(),
        })
    }
}

impl EntryStore for MemoryStore {
    fn get_entry(&self, id: EntryId) -> Result<Entry> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        let inner = self.read()?;
        inner
            .entries
            .get(&id)
            .cloned()
            .ok_or(SnapError::EntryNotFound { entry_id: id })
    }

    fn search(&self, terms: &[SearchTerm]) -> Result<Vec<Entry>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(term) = terms
            .iter()
            .find(|t| matches!(t.predicate, Predicate::IsClose { .. }))
        {
            return Err(SnapError::InvalidInput {
                reason: format!(
                    "isclose on '{}' must be expanded into range terms before searching",
                    term.attr
                ),
            });
        }

        let inner = self.read()?;
        Ok(inner
            .order
            .iter()
            .filter_map(|id| inner.entries.get(id))
            .filter(|entry| terms.iter().all(|t| t.matches(entry) == Some(true)))
            .cloned()
            .collect())
    }

    fn save_entry(&self, entry: Entry) -> Result<()> {
        let mut inner = self.write()?;
        let id = entry.id();
        if entry.as_nestable().is_some() && !inner.root.contains(&id) {
            inner.root.push(id);
        }
        inner.index(entry);
        Ok(())
    }

    fn delete_entry(&self, entry: &Entry) -> Result<()> {
        let mut inner = self.write()?;
        let id = entry.id();
        if inner.entries.remove(&id).is_none() {
            return Err(SnapError::EntryNotFound { entry_id: id });
        }
        inner.order.retain(|other| *other != id);
        inner.root.retain(|other| *other != id);
        Ok(())
    }

    fn get_meta_pvs(&self) -> Vec<Parameter> {
        self.read().map(|inner| inner.meta_pvs.clone()).unwrap_or_default()
    }

    fn get_tags(&self) -> TagDef {
        self.read().map(|inner| inner.tags.clone()).unwrap_or_default()
    }

    fn root(&self) -> Root {
        let entries = self
            .read()
            .map(|inner| {
                inner
                    .root
                    .iter()
                    .filter_map(|id| inner.entries.get(id))
                    .cloned()
                    .map(Child::Resolved)
                    .collect()
            })
            .unwrap_or_default();
        Root { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Collection, EntryKind};

    #[test]
    fn test_nested_entries_are_indexed() {
        let param = Parameter::new("SIM:PV1");
        let param_id = param.id;
        let coll = Collection::new("C").with_child(param);
        let store = MemoryStore::with_entries([coll.into()]);

        assert_eq!(store.len(), 2);
        assert_eq!(store.get_entry(param_id).unwrap().id(), param_id);
        assert_eq!(store.root().entries.len(), 1);
    }

    #[test]
    fn test_get_missing_entry() {
        let store = MemoryStore::new();
        let id = EntryId::new();
        assert_eq!(
            store.get_entry(id),
            Err(SnapError::EntryNotFound { entry_id: id })
        );
        assert_eq!(store.call_count(), 1);
    }

    #[test]
    fn test_search_by_entry_type_keeps_insertion_order() {
        let a = Parameter::new("A");
        let b = Parameter::new("B");
        let store = MemoryStore::with_entries([a.clone().into(), Collection::new("C").into(), b.clone().into()]);

        let found = store.search(&[SearchTerm::entry_type(EntryKind::Parameter)]).unwrap();
        let ids: Vec<_> = found.iter().map(Entry::id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }

    #[test]
    fn test_unexpanded_is_close_rejected() {
        let store = MemoryStore::new();
        let err = store
            .search(&[SearchTerm::is_close("data", 1.0, 0.1, 0.0)])
            .unwrap_err();
        assert!(matches!(err, SnapError::InvalidInput { .. }));
    }

    #[test]
    fn test_save_and_delete() {
        let store = MemoryStore::new();
        let coll: Entry = Collection::new("C").into();
        store.save_entry(coll.clone()).unwrap();
        assert_eq!(store.root().entries.len(), 1);

        store.delete_entry(&coll).unwrap();
        assert!(store.is_empty());
        assert!(store.root().entries.is_empty());
        assert!(store.delete_entry(&coll).is_err());
    }

    #[test]
    fn test_from_json_str() {
        let id = EntryId::new();
        let json = format!(
            r#"{{
                "entries": [
                    {{"entry_type": "Parameter", "id": "{id}", "creation_time": "2024-01-01T00:00:00Z",
                      "pv_name": "SIM:PV1", "read_only": true}}
                ],
                "meta_pvs": [
                    {{"id": "{meta}", "creation_time": "2024-01-01T00:00:00Z", "pv_name": "ACCL:GUN:ENERGY"}}
                ]
            }}"#,
            id = id,
            meta = EntryId::new(),
        );
        let store = MemoryStore::from_json_str(&json).unwrap();
        assert_eq!(store.get_entry(id).unwrap().pv_name(), Some("SIM:PV1"));
        assert_eq!(store.get_meta_pvs()[0].pv_name, "ACCL:GUN:ENERGY");
        assert!(store.get_tags().is_empty());
    }
}
