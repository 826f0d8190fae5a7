//! The entry sum type, child slots and the store root

use chrono::{DateTime, Utc};
use pvsnap_core_types::EntryId;
use serde::{Deserialize, Serialize};

use super::{Collection, Parameter, Readback, Setpoint, Snapshot};

/// Runtime type of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    Collection,
    Snapshot,
    Parameter,
    Setpoint,
    Readback,
}

impl EntryKind {
    pub fn name(&self) -> &'static str {
        match self {
            EntryKind::Collection => "Collection",
            EntryKind::Snapshot => "Snapshot",
            EntryKind::Parameter => "Parameter",
            EntryKind::Setpoint => "Setpoint",
            EntryKind::Readback => "Readback",
        }
    }

    /// Parse a kind from its name, ignoring case
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "collection" => Some(EntryKind::Collection),
            "snapshot" => Some(EntryKind::Snapshot),
            "parameter" => Some(EntryKind::Parameter),
            "setpoint" => Some(EntryKind::Setpoint),
            "readback" => Some(EntryKind::Readback),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Capability of entries that own an ordered list of children
pub trait Nestable {
    fn children(&self) -> &[Child];
    fn children_mut(&mut self) -> &mut Vec<Child>;

    /// Whether any child slot still holds an identifier
    fn has_unresolved(&self) -> bool {
        self.children().iter().any(|c| !c.is_resolved())
    }
}

/// Any node of the configuration graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entry_type")]
pub enum Entry {
    Collection(Collection),
    Snapshot(Snapshot),
    Parameter(Parameter),
    Setpoint(Setpoint),
    Readback(Readback),
}

impl Entry {
    pub fn id(&self) -> EntryId {
        match self {
            Entry::Collection(e) => e.id,
            Entry::Snapshot(e) => e.id,
            Entry::Parameter(e) => e.id,
            Entry::Setpoint(e) => e.id,
            Entry::Readback(e) => e.id,
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            Entry::Collection(_) => EntryKind::Collection,
            Entry::Snapshot(_) => EntryKind::Snapshot,
            Entry::Parameter(_) => EntryKind::Parameter,
            Entry::Setpoint(_) => EntryKind::Setpoint,
            Entry::Readback(_) => EntryKind::Readback,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Entry::Collection(e) => &e.description,
            Entry::Snapshot(e) => &e.description,
            Entry::Parameter(e) => &e.description,
            Entry::Setpoint(e) => &e.description,
            Entry::Readback(e) => &e.description,
        }
    }

    pub fn creation_time(&self) -> DateTime<Utc> {
        match self {
            Entry::Collection(e) => e.creation_time,
            Entry::Snapshot(e) => e.creation_time,
            Entry::Parameter(e) => e.creation_time,
            Entry::Setpoint(e) => e.creation_time,
            Entry::Readback(e) => e.creation_time,
        }
    }

    /// Title of a nestable entry
    pub fn title(&self) -> Option<&str> {
        match self {
            Entry::Collection(e) => Some(&e.title),
            Entry::Snapshot(e) => Some(&e.title),
            _ => None,
        }
    }

    /// PV name of a leaf entry
    pub fn pv_name(&self) -> Option<&str> {
        match self {
            Entry::Parameter(e) => Some(&e.pv_name),
            Entry::Setpoint(e) => Some(&e.pv_name),
            Entry::Readback(e) => Some(&e.pv_name),
            _ => None,
        }
    }

    pub fn as_nestable(&self) -> Option<&dyn Nestable> {
        match self {
            Entry::Collection(c) => Some(c),
            Entry::Snapshot(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_nestable_mut(&mut self) -> Option<&mut dyn Nestable> {
        match self {
            Entry::Collection(c) => Some(c),
            Entry::Snapshot(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.as_nestable().is_none()
    }
}

impl From<Collection> for Entry {
    fn from(e: Collection) -> Self {
        Entry::Collection(e)
    }
}

impl From<Snapshot> for Entry {
    fn from(e: Snapshot) -> Self {
        Entry::Snapshot(e)
    }
}

impl From<Parameter> for Entry {
    fn from(e: Parameter) -> Self {
        Entry::Parameter(e)
    }
}

impl From<Setpoint> for Entry {
    fn from(e: Setpoint) -> Self {
        Entry::Setpoint(e)
    }
}

impl From<Readback> for Entry {
    fn from(e: Readback) -> Self {
        Entry::Readback(e)
    }
}

/// A child slot: an owned entry, or the identifier standing in for one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Child {
    Resolved(Entry),
    Unresolved(EntryId),
}

impl Child {
    pub fn id(&self) -> EntryId {
        match self {
            Child::Resolved(e) => e.id(),
            Child::Unresolved(id) => *id,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Child::Resolved(_))
    }

    pub fn entry(&self) -> Option<&Entry> {
        match self {
            Child::Resolved(e) => Some(e),
            Child::Unresolved(_) => None,
        }
    }

    pub fn entry_mut(&mut self) -> Option<&mut Entry> {
        match self {
            Child::Resolved(e) => Some(e),
            Child::Unresolved(_) => None,
        }
    }
}

impl From<Entry> for Child {
    fn from(e: Entry) -> Self {
        Child::Resolved(e)
    }
}

impl From<EntryId> for Child {
    fn from(id: EntryId) -> Self {
        Child::Unresolved(id)
    }
}

impl From<Collection> for Child {
    fn from(e: Collection) -> Self {
        Child::Resolved(e.into())
    }
}

impl From<Snapshot> for Child {
    fn from(e: Snapshot) -> Self {
        Child::Resolved(e.into())
    }
}

impl From<Parameter> for Child {
    fn from(e: Parameter) -> Self {
        Child::Resolved(e.into())
    }
}

impl From<Setpoint> for Child {
    fn from(e: Setpoint) -> Self {
        Child::Resolved(e.into())
    }
}

impl From<Readback> for Child {
    fn from(e: Readback) -> Self {
        Child::Resolved(e.into())
    }
}

/// Top-level container of first-class entries (collections and snapshots)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Root {
    pub entries: Vec<Child>,
}
