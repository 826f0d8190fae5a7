//! Diff output types.
//!
//! All types implement `Debug, Clone, Serialize, Deserialize, PartialEq`.

use chrono::{DateTime, Utc};
use pvsnap_core_types::EntryId;
use serde::{Deserialize, Serialize};

use crate::model::{Entry, EpicsValue, Severity, Status, TagSet};

/// One step from an entry to a field inside it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathSegment {
    /// Named field of an entry
    Field(String),
    /// Position within a list field
    Index(usize),
}

impl std::fmt::Display for PathSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathSegment::Field(name) => write!(f, "{}", name),
            PathSegment::Index(i) => write!(f, "[{}]", i),
        }
    }
}

/// Render a path as `children[1].readback.data`
pub fn render_path(path: &[PathSegment]) -> String {
    let mut out = String::new();
    for segment in path {
        if let PathSegment::Field(_) = segment {
            if !out.is_empty() {
                out.push('.');
            }
        }
        out.push_str(&segment.to_string());
    }
    out
}

/// A value on one side of a diff record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DiffValue {
    /// Optional field or sub-entry that is not set
    Absent,
    Id(EntryId),
    Text(String),
    Time(DateTime<Utc>),
    Bool(bool),
    Number(Option<f64>),
    Value(EpicsValue),
    Status(Status),
    Severity(Severity),
    Tags(#[serde(with = "crate::model::tags::tag_set_pairs")] TagSet),
    /// A whole entry, reported when runtime types differ
    Entry(Box<Entry>),
    /// Length of a list field, reported when lengths differ
    Length(usize),
}

impl DiffValue {
    /// Equality used by the diff walk: floats compare bit for bit, so a NaN
    /// reading matches its own copy and `0.0` differs from `-0.0`
    pub fn same_as(&self, other: &Self) -> bool {
        match (self, other) {
            (DiffValue::Number(Some(x)), DiffValue::Number(Some(y)))
            | (DiffValue::Value(EpicsValue::Float(x)), DiffValue::Value(EpicsValue::Float(y))) => {
                x.to_bits() == y.to_bits()
            }
            _ => self == other,
        }
    }
}

impl std::fmt::Display for DiffValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiffValue::Absent => write!(f, "<none>"),
            DiffValue::Id(id) => write!(f, "{}", id),
            DiffValue::Text(s) => write!(f, "{:?}", s),
            DiffValue::Time(t) => write!(f, "{}", t.to_rfc3339()),
            DiffValue::Bool(b) => write!(f, "{}", b),
            DiffValue::Number(Some(x)) => write!(f, "{}", x),
            DiffValue::Number(None) => write!(f, "<none>"),
            DiffValue::Value(v) => write!(f, "{}", v),
            DiffValue::Status(s) => write!(f, "{:?}", s),
            DiffValue::Severity(s) => write!(f, "{:?}", s),
            DiffValue::Tags(tags) => write!(f, "{:?}", tags),
            DiffValue::Entry(e) => write!(f, "{} {}", e.kind(), e.id()),
            DiffValue::Length(n) => write!(f, "{} items", n),
        }
    }
}

/// One field-level discrepancy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffItem {
    /// Path from the compared root; empty when the whole entries differ
    pub path: Vec<PathSegment>,
    pub original_value: DiffValue,
    pub new_value: DiffValue,
}

impl DiffItem {
    pub fn path_string(&self) -> String {
        render_path(&self.path)
    }
}

/// The result of comparing two entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryDiff {
    pub original_entry: Entry,
    pub new_entry: Entry,
    /// Discrepancies in walk order
    pub diffs: Vec<DiffItem>,
}

impl EntryDiff {
    pub fn is_empty(&self) -> bool {
        self.diffs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diffs.len()
    }

    /// Diff records at or below `prefix`
    pub fn under<'a>(&'a self, prefix: &'a [PathSegment]) -> impl Iterator<Item = &'a DiffItem> {
        self.diffs.iter().filter(move |d| d.path.starts_with(prefix))
    }
}
