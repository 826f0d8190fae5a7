//! Ordered field views of entries for structural comparison

use pvsnap_core_types::EntryId;

use super::model::DiffValue;
use crate::model::{Child, Collection, Entry, Parameter, Readback, Setpoint, Snapshot};

/// A comparable structured entry
///
/// `fields` lists (name, value) pairs in a stable order; two values of the
/// same type always list the same names.
pub trait FieldSet {
    /// Runtime type name, compared before descending
    fn type_name(&self) -> &'static str;

    fn fields(&self) -> Vec<(&'static str, FieldValue<'_>)>;

    /// Owned copy as a graph entry, for reporting whole-entry differences
    fn to_entry(&self) -> Entry;
}

/// The value of one field
pub enum FieldValue<'a> {
    /// Compared by exact equality
    Scalar(DiffValue),
    /// Optional sub-entry, compared recursively
    Nested(Option<Node<'a>>),
    /// Ordered sub-entries, compared by position
    List(Vec<Node<'a>>),
}

/// A sub-entry inside a field
#[derive(Clone, Copy)]
pub enum Node<'a> {
    Set(&'a dyn FieldSet),
    Id(EntryId),
}

impl<'a> Node<'a> {
    pub fn from_child(child: &'a Child) -> Self {
        match child {
            Child::Resolved(entry) => Node::Set(entry),
            Child::Unresolved(id) => Node::Id(*id),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Node::Set(set) => set.type_name(),
            Node::Id(_) => "EntryId",
        }
    }

    pub fn to_value(&self) -> DiffValue {
        match self {
            Node::Set(set) => DiffValue::Entry(Box::new(set.to_entry())),
            Node::Id(id) => DiffValue::Id(*id),
        }
    }
}

fn children(children: &[Child]) -> FieldValue<'_> {
    FieldValue::List(children.iter().map(Node::from_child).collect())
}

fn text(s: &str) -> FieldValue<'static> {
    FieldValue::Scalar(DiffValue::Text(s.to_string()))
}

impl FieldSet for Collection {
    fn type_name(&self) -> &'static str {
        "Collection"
    }

    fn fields(&self) -> Vec<(&'static str, FieldValue<'_>)> {
        vec![
            ("id", FieldValue::Scalar(DiffValue::Id(self.id))),
            ("title", text(&self.title)),
            ("description", text(&self.description)),
            ("creation_time", FieldValue::Scalar(DiffValue::Time(self.creation_time))),
            ("tags", FieldValue::Scalar(DiffValue::Tags(self.tags.clone()))),
            ("children", children(&self.children)),
        ]
    }

    fn to_entry(&self) -> Entry {
        Entry::Collection(self.clone())
    }
}

impl FieldSet for Snapshot {
    fn type_name(&self) -> &'static str {
        "Snapshot"
    }

    fn fields(&self) -> Vec<(&'static str, FieldValue<'_>)> {
        vec![
            ("id", FieldValue::Scalar(DiffValue::Id(self.id))),
            ("title", text(&self.title)),
            ("description", text(&self.description)),
            ("creation_time", FieldValue::Scalar(DiffValue::Time(self.creation_time))),
            ("tags", FieldValue::Scalar(DiffValue::Tags(self.tags.clone()))),
            (
                "origin_collection",
                FieldValue::Nested(self.origin_collection.as_deref().map(Node::from_child)),
            ),
            (
                "meta_pvs",
                FieldValue::List(
                    self.meta_pvs
                        .iter()
                        .map(|r| Node::Set(r as &dyn FieldSet))
                        .collect(),
                ),
            ),
            ("children", children(&self.children)),
        ]
    }

    fn to_entry(&self) -> Entry {
        Entry::Snapshot(self.clone())
    }
}

impl FieldSet for Parameter {
    fn type_name(&self) -> &'static str {
        "Parameter"
    }

    fn fields(&self) -> Vec<(&'static str, FieldValue<'_>)> {
        vec![
            ("id", FieldValue::Scalar(DiffValue::Id(self.id))),
            ("pv_name", text(&self.pv_name)),
            ("description", text(&self.description)),
            ("creation_time", FieldValue::Scalar(DiffValue::Time(self.creation_time))),
            ("read_only", FieldValue::Scalar(DiffValue::Bool(self.read_only))),
            ("abs_tolerance", FieldValue::Scalar(DiffValue::Number(self.abs_tolerance))),
            ("rel_tolerance", FieldValue::Scalar(DiffValue::Number(self.rel_tolerance))),
            ("tags", FieldValue::Scalar(DiffValue::Tags(self.tags.clone()))),
            (
                "readback",
                FieldValue::Nested(self.readback.as_deref().map(|r| Node::Set(r as &dyn FieldSet))),
            ),
        ]
    }

    fn to_entry(&self) -> Entry {
        Entry::Parameter(self.clone())
    }
}

impl FieldSet for Setpoint {
    fn type_name(&self) -> &'static str {
        "Setpoint"
    }

    fn fields(&self) -> Vec<(&'static str, FieldValue<'_>)> {
        vec![
            ("id", FieldValue::Scalar(DiffValue::Id(self.id))),
            ("pv_name", text(&self.pv_name)),
            ("description", text(&self.description)),
            ("creation_time", FieldValue::Scalar(DiffValue::Time(self.creation_time))),
            ("data", FieldValue::Scalar(DiffValue::Value(self.data.clone()))),
            ("status", FieldValue::Scalar(DiffValue::Status(self.status))),
            ("severity", FieldValue::Scalar(DiffValue::Severity(self.severity))),
            ("tags", FieldValue::Scalar(DiffValue::Tags(self.tags.clone()))),
            (
                "readback",
                FieldValue::Nested(self.readback.as_deref().map(|r| Node::Set(r as &dyn FieldSet))),
            ),
        ]
    }

    fn to_entry(&self) -> Entry {
        Entry::Setpoint(self.clone())
    }
}

impl FieldSet for Readback {
    fn type_name(&self) -> &'static str {
        "Readback"
    }

    fn fields(&self) -> Vec<(&'static str, FieldValue<'_>)> {
        vec![
            ("id", FieldValue::Scalar(DiffValue::Id(self.id))),
            ("pv_name", text(&self.pv_name)),
            ("description", text(&self.description)),
            ("creation_time", FieldValue::Scalar(DiffValue::Time(self.creation_time))),
            ("data", FieldValue::Scalar(DiffValue::Value(self.data.clone()))),
            ("status", FieldValue::Scalar(DiffValue::Status(self.status))),
            ("severity", FieldValue::Scalar(DiffValue::Severity(self.severity))),
            ("abs_tolerance", FieldValue::Scalar(DiffValue::Number(self.abs_tolerance))),
            ("rel_tolerance", FieldValue::Scalar(DiffValue::Number(self.rel_tolerance))),
            ("tags", FieldValue::Scalar(DiffValue::Tags(self.tags.clone()))),
        ]
    }

    fn to_entry(&self) -> Entry {
        Entry::Readback(self.clone())
    }
}

impl FieldSet for Entry {
    fn type_name(&self) -> &'static str {
        self.kind().name()
    }

    fn fields(&self) -> Vec<(&'static str, FieldValue<'_>)> {
        match self {
            Entry::Collection(e) => e.fields(),
            Entry::Snapshot(e) => e.fields(),
            Entry::Parameter(e) => e.fields(),
            Entry::Setpoint(e) => e.fields(),
            Entry::Readback(e) => e.fields(),
        }
    }

    fn to_entry(&self) -> Entry {
        self.clone()
    }
}

/// Scalar value of a named field, if the entry has one
pub fn scalar_field(entry: &Entry, name: &str) -> Option<DiffValue> {
    entry.fields().into_iter().find_map(|(field, value)| match value {
        FieldValue::Scalar(v) if field == name => Some(v),
        _ => None,
    })
}
