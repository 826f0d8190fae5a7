//! Structural diff computation.
//!
//! [`walk_find_diff`] walks two field sets in lockstep and records every
//! field whose values are not exactly equal.

use super::fields::{FieldSet, FieldValue, Node};
use super::model::{DiffItem, DiffValue, PathSegment};

/// Compare two entries field by field
///
/// Differing runtime types produce a single record with an empty path.
/// Unresolved identifiers are compared as identifiers; resolve both sides
/// first to compare structure.
pub fn walk_find_diff(original: &dyn FieldSet, new: &dyn FieldSet) -> Vec<DiffItem> {
    let mut diffs = Vec::new();
    let mut path = Vec::new();
    walk_node(Node::Set(original), Node::Set(new), &mut path, &mut diffs);
    diffs
}

fn record(path: &[PathSegment], original_value: DiffValue, new_value: DiffValue, diffs: &mut Vec<DiffItem>) {
    diffs.push(DiffItem {
        path: path.to_vec(),
        original_value,
        new_value,
    });
}

fn walk_node(a: Node<'_>, b: Node<'_>, path: &mut Vec<PathSegment>, diffs: &mut Vec<DiffItem>) {
    match (a, b) {
        (Node::Set(x), Node::Set(y)) if x.type_name() == y.type_name() => {
            walk_fields(x, y, path, diffs);
        }
        (Node::Id(x), Node::Id(y)) if x == y => {}
        _ => record(path, a.to_value(), b.to_value(), diffs),
    }
}

fn walk_fields(a: &dyn FieldSet, b: &dyn FieldSet, path: &mut Vec<PathSegment>, diffs: &mut Vec<DiffItem>) {
    for ((name, va), (_, vb)) in a.fields().into_iter().zip(b.fields()) {
        path.push(PathSegment::Field(name.to_string()));
        match (va, vb) {
            (FieldValue::Scalar(x), FieldValue::Scalar(y)) => {
                if !x.same_as(&y) {
                    record(path, x, y, diffs);
                }
            }
            (FieldValue::Nested(x), FieldValue::Nested(y)) => match (x, y) {
                (None, None) => {}
                (Some(x), None) => record(path, x.to_value(), DiffValue::Absent, diffs),
                (None, Some(y)) => record(path, DiffValue::Absent, y.to_value(), diffs),
                (Some(x), Some(y)) => walk_node(x, y, path, diffs),
            },
            (FieldValue::List(xs), FieldValue::List(ys)) => {
                for (i, (x, y)) in xs.iter().zip(ys.iter()).enumerate() {
                    path.push(PathSegment::Index(i));
                    walk_node(*x, *y, path, diffs);
                    path.pop();
                }
                if xs.len() != ys.len() {
                    record(
                        path,
                        DiffValue::Length(xs.len()),
                        DiffValue::Length(ys.len()),
                        diffs,
                    );
                }
            }
            // Same type name implies the same field layout
            _ => {}
        }
        path.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::model::render_path;
    use crate::model::{Collection, Entry, EpicsValue, Parameter, Readback, Setpoint, Snapshot};
    use pvsnap_core_types::EntryId;
    use proptest::prelude::*;

    fn sample_snapshot() -> Snapshot {
        Snapshot::new("snap")
            .with_child(Setpoint::new("MTR:1", 1.0).with_readback(Readback::new("MTR:1:RBV", 0.99)))
            .with_child(Readback::new("TMP:1", 5_i64))
    }

    #[test]
    fn test_identical_copy_has_no_diffs() {
        let snap = Entry::from(sample_snapshot());
        let copy = snap.clone();
        assert!(walk_find_diff(&snap, &copy).is_empty());
    }

    #[test]
    fn test_nan_reading_matches_its_copy() {
        let sp = Setpoint::new("MTR:1", f64::NAN);
        let nan = Entry::from(sp.clone());
        assert!(walk_find_diff(&nan, &nan.clone()).is_empty());

        let other = Entry::from(Setpoint { data: EpicsValue::Float(1.0), ..sp });
        assert_eq!(walk_find_diff(&nan, &other).len(), 1);
    }

    #[test]
    fn test_type_mismatch_is_one_root_record() {
        let a = Entry::from(Collection::new("c"));
        let b = Entry::from(Snapshot::new("c"));
        let diffs = walk_find_diff(&a, &b);
        assert_eq!(diffs.len(), 1);
        assert!(diffs[0].path.is_empty());
        assert!(matches!(diffs[0].original_value, DiffValue::Entry(_)));
    }

    #[test]
    fn test_nested_readback_data_path() {
        let a = sample_snapshot();
        let mut b = a.clone();
        if let Some(Entry::Setpoint(sp)) = b.children[0].entry_mut() {
            if let Some(rb) = sp.readback.as_mut() {
                rb.data = EpicsValue::Float(0.5);
            }
        }

        let diffs = walk_find_diff(&a, &b);
        assert_eq!(diffs.len(), 1);
        assert_eq!(render_path(&diffs[0].path), "children[0].readback.data");
        assert_eq!(diffs[0].original_value, DiffValue::Value(EpicsValue::Float(0.99)));
        assert_eq!(diffs[0].new_value, DiffValue::Value(EpicsValue::Float(0.5)));
    }

    #[test]
    fn test_list_length_mismatch_reported_once() {
        let a = sample_snapshot();
        let mut b = a.clone();
        b.children.push(Readback::new("EXTRA", 1_i64).into());

        let diffs = walk_find_diff(&a, &b);
        assert_eq!(diffs.len(), 1);
        assert_eq!(render_path(&diffs[0].path), "children");
        assert_eq!(diffs[0].original_value, DiffValue::Length(2));
        assert_eq!(diffs[0].new_value, DiffValue::Length(3));
    }

    #[test]
    fn test_nested_type_mismatch_stops_descent() {
        let a = Collection::new("c").with_child(Parameter::new("A"));
        let mut b = a.clone();
        b.children[0] = Collection::new("inner").into();

        let diffs = walk_find_diff(&a, &b);
        assert_eq!(diffs.len(), 1);
        assert_eq!(render_path(&diffs[0].path), "children[0]");
    }

    #[test]
    fn test_unresolved_children_compare_by_id() {
        let shared = EntryId::new();
        let a = Collection::new("c").with_child(shared);
        let b = a.clone();
        assert!(walk_find_diff(&a, &b).is_empty());

        let mut c = a.clone();
        c.children[0] = EntryId::new().into();
        let diffs = walk_find_diff(&a, &c);
        assert_eq!(diffs.len(), 1);
        assert!(matches!(diffs[0].original_value, DiffValue::Id(id) if id == shared));
    }

    #[test]
    fn test_optional_readback_added() {
        let a = Parameter::new("A");
        let mut b = a.clone();
        b.readback = Some(Box::new(Parameter::new("A:RBV")));

        let diffs = walk_find_diff(&a, &b);
        assert_eq!(diffs.len(), 1);
        assert_eq!(render_path(&diffs[0].path), "readback");
        assert_eq!(diffs[0].original_value, DiffValue::Absent);
    }

    proptest! {
        #[test]
        fn prop_diff_against_self_is_empty(values in proptest::collection::vec(-1e6f64..1e6, 0..8)) {
            let mut snap = Snapshot::new("prop");
            for (i, v) in values.iter().enumerate() {
                snap.children.push(Setpoint::new(format!("PV:{}", i), *v).into());
            }
            let entry = Entry::from(snap);
            prop_assert!(walk_find_diff(&entry, &entry.clone()).is_empty());
        }
    }
}
