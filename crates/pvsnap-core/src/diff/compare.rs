//! Client entry point for structural comparison

use super::engine::walk_find_diff;
use super::model::{DiffItem, DiffValue, EntryDiff};
use crate::client::Client;
use crate::errors::Result;
use crate::model::Entry;
use crate::{log_op_end, log_op_error, log_op_start};

impl Client {
    /// Compare two entries after resolving both completely
    ///
    /// Entries of differing runtime types short-circuit to one record with an
    /// empty path and are not resolved.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` when either side references a missing entry.
    pub fn compare(&self, original: Entry, new: Entry) -> Result<EntryDiff> {
        log_op_start!(
            "compare",
            original_id = %original.id(),
            new_id = %new.id()
        );
        let start = std::time::Instant::now();

        let diff = self.compare_impl(original, new).map_err(|e| {
            log_op_error!(
                "compare",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "compare",
            duration_ms = start.elapsed().as_millis() as u64,
            diff_count = diff.len()
        );
        Ok(diff)
    }

    fn compare_impl(&self, mut original: Entry, mut new: Entry) -> Result<EntryDiff> {
        if original.kind() != new.kind() {
            let item = DiffItem {
                path: Vec::new(),
                original_value: DiffValue::Entry(Box::new(original.clone())),
                new_value: DiffValue::Entry(Box::new(new.clone())),
            };
            return Ok(EntryDiff {
                original_entry: original,
                new_entry: new,
                diffs: vec![item],
            });
        }

        self.fill(&mut original, None)?;
        self.fill(&mut new, None)?;
        let diffs = walk_find_diff(&original, &new);
        Ok(EntryDiff {
            original_entry: original,
            new_entry: new,
            diffs,
        })
    }
}
