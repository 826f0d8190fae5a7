//! Plain-text rendering of an [`EntryDiff`].

use super::model::EntryDiff;

/// One line per record: `path: original -> new`
///
/// A record with an empty path is rendered as `<entry>`.
pub fn render_human_summary(diff: &EntryDiff) -> String {
    if diff.is_empty() {
        return "No differences\n".to_string();
    }
    let mut out = format!("{} difference(s)\n", diff.len());
    for item in &diff.diffs {
        let path = item.path_string();
        let path = if path.is_empty() { "<entry>" } else { path.as_str() };
        out.push_str(&format!(
            "  {}: {} -> {}\n",
            path, item.original_value, item.new_value
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::model::{DiffItem, DiffValue, PathSegment};
    use crate::model::{Entry, EpicsValue, Setpoint};

    #[test]
    fn test_summary_lists_each_record() {
        let a = Entry::from(Setpoint::new("A", 1.0));
        let diff = EntryDiff {
            original_entry: a.clone(),
            new_entry: a,
            diffs: vec![DiffItem {
                path: vec![PathSegment::Field("data".into())],
                original_value: DiffValue::Value(EpicsValue::Float(1.0)),
                new_value: DiffValue::Value(EpicsValue::Float(2.0)),
            }],
        };
        let text = render_human_summary(&diff);
        assert!(text.starts_with("1 difference(s)"));
        assert!(text.contains("data: 1 -> 2"));
    }
}
