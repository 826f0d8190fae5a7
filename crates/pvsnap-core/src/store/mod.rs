//! Entry store interface and search predicates
//!
//! The persistent store is an external collaborator. The core talks to it
//! only through [`EntryStore`]; [`MemoryStore`] is the in-process
//! implementation used by tests and tools.

pub mod memory;

use std::cmp::Ordering;
use std::sync::Arc;

use pvsnap_core_types::EntryId;
use serde::{Deserialize, Serialize};

use crate::diff::fields::scalar_field;
use crate::diff::DiffValue;
use crate::errors::Result;
use crate::model::{Entry, EntryKind, EpicsValue, Parameter, Root, TagDef};

pub use memory::MemoryStore;

/// Backing storage for entries
///
/// Every call may block. Implementations are shared across threads.
pub trait EntryStore: Send + Sync {
    /// Fetch one entry by identifier
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` when no entry has this identifier.
    fn get_entry(&self, id: EntryId) -> Result<Entry>;

    /// Entries matching every term
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for predicates the store cannot evaluate.
    fn search(&self, terms: &[SearchTerm]) -> Result<Vec<Entry>>;

    /// Insert or replace an entry
    ///
    /// # Errors
    ///
    /// Implementation-specific storage failures.
    fn save_entry(&self, entry: Entry) -> Result<()>;

    /// Remove an entry
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` when the entry is not stored.
    fn delete_entry(&self, entry: &Entry) -> Result<()>;

    /// PVs captured alongside every snapshot
    fn get_meta_pvs(&self) -> Vec<Parameter>;

    /// Tag groups available to entries
    fn get_tags(&self) -> TagDef;

    /// Top-level collections and snapshots
    fn root(&self) -> Root;
}

/// Shared handle to a store, so callers can keep inspecting it after handing
/// a clone to a [`crate::Client`]
impl<S: EntryStore + ?Sized> EntryStore for Arc<S> {
    fn get_entry(&self, id: EntryId) -> Result<Entry> {
        (**self).get_entry(id)
    }

    fn search(&self, terms: &[SearchTerm]) -> Result<Vec<Entry>> {
        (**self).search(terms)
    }

    fn save_entry(&self, entry: Entry) -> Result<()> {
        (**self).save_entry(entry)
    }

    fn delete_entry(&self, entry: &Entry) -> Result<()> {
        (**self).delete_entry(entry)
    }

    fn get_meta_pvs(&self) -> Vec<Parameter> {
        (**self).get_meta_pvs()
    }

    fn get_tags(&self) -> TagDef {
        (**self).get_tags()
    }

    fn root(&self) -> Root {
        (**self).root()
    }
}

/// Comparison value for a search term
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SearchValue {
    Id(EntryId),
    Kind(EntryKind),
    Text(String),
    Number(f64),
    Bool(bool),
}

impl From<EntryId> for SearchValue {
    fn from(id: EntryId) -> Self {
        SearchValue::Id(id)
    }
}

impl From<EntryKind> for SearchValue {
    fn from(kind: EntryKind) -> Self {
        SearchValue::Kind(kind)
    }
}

impl From<&str> for SearchValue {
    fn from(s: &str) -> Self {
        SearchValue::Text(s.to_string())
    }
}

impl From<f64> for SearchValue {
    fn from(n: f64) -> Self {
        SearchValue::Number(n)
    }
}

impl From<bool> for SearchValue {
    fn from(b: bool) -> Self {
        SearchValue::Bool(b)
    }
}

/// Search operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    Eq(SearchValue),
    Lt(SearchValue),
    Gt(SearchValue),
    Lte(SearchValue),
    Gte(SearchValue),
    /// Expanded into `Gt(lower)` and `Lt(upper)` before reaching a store
    IsClose {
        target: f64,
        rel_tol: f64,
        abs_tol: f64,
    },
}

/// One condition on one attribute of an entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchTerm {
    pub attr: String,
    pub predicate: Predicate,
}

impl SearchTerm {
    pub fn new(attr: impl Into<String>, predicate: Predicate) -> Self {
        Self {
            attr: attr.into(),
            predicate,
        }
    }

    pub fn eq(attr: impl Into<String>, value: impl Into<SearchValue>) -> Self {
        Self::new(attr, Predicate::Eq(value.into()))
    }

    /// Match entries of one runtime type
    pub fn entry_type(kind: EntryKind) -> Self {
        Self::eq("entry_type", kind)
    }

    pub fn is_close(attr: impl Into<String>, target: f64, rel_tol: f64, abs_tol: f64) -> Self {
        Self::new(
            attr,
            Predicate::IsClose {
                target,
                rel_tol,
                abs_tol,
            },
        )
    }
}

/// The searchable value of `attr` on `entry`
///
/// `uuid`/`id` and `entry_type` are virtual attributes; everything else is a
/// scalar field of the entry.
pub fn attribute_value(entry: &Entry, attr: &str) -> Option<SearchValue> {
    match attr {
        "uuid" | "id" => Some(SearchValue::Id(entry.id())),
        "entry_type" => Some(SearchValue::Kind(entry.kind())),
        _ => match scalar_field(entry, attr)? {
            DiffValue::Id(id) => Some(SearchValue::Id(id)),
            DiffValue::Text(s) => Some(SearchValue::Text(s)),
            DiffValue::Bool(b) => Some(SearchValue::Bool(b)),
            DiffValue::Number(n) => n.map(SearchValue::Number),
            DiffValue::Value(v) => match v {
                EpicsValue::Bool(b) => Some(SearchValue::Bool(b)),
                EpicsValue::Str(s) => Some(SearchValue::Text(s)),
                other => other.as_f64().map(SearchValue::Number),
            },
            _ => None,
        },
    }
}

fn compare_values(left: &SearchValue, right: &SearchValue) -> Option<Ordering> {
    match (left, right) {
        (SearchValue::Number(a), SearchValue::Number(b)) => a.partial_cmp(b),
        (SearchValue::Text(a), SearchValue::Text(b)) => Some(a.cmp(b)),
        (SearchValue::Bool(a), SearchValue::Bool(b)) => Some(a.cmp(b)),
        (SearchValue::Id(a), SearchValue::Id(b)) => Some(a.cmp(b)),
        (SearchValue::Kind(a), SearchValue::Kind(b)) if a == b => Some(Ordering::Equal),
        _ => None,
    }
}

impl SearchTerm {
    /// Evaluate this term against one entry
    ///
    /// Entries lacking the attribute never match. Returns `None` for
    /// `IsClose`, which stores do not evaluate.
    pub fn matches(&self, entry: &Entry) -> Option<bool> {
        let value = match attribute_value(entry, &self.attr) {
            Some(v) => v,
            None => return Some(false),
        };
        let (target, wanted): (&SearchValue, &[Ordering]) = match &self.predicate {
            Predicate::Eq(t) => (t, &[Ordering::Equal]),
            Predicate::Lt(t) => (t, &[Ordering::Less]),
            Predicate::Gt(t) => (t, &[Ordering::Greater]),
            Predicate::Lte(t) => (t, &[Ordering::Less, Ordering::Equal]),
            Predicate::Gte(t) => (t, &[Ordering::Greater, Ordering::Equal]),
            Predicate::IsClose { .. } => return None,
        };
        Some(compare_values(&value, target).is_some_and(|o| wanted.contains(&o)))
    }
}
