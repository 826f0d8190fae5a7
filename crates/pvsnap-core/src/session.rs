//! Caller-owned selection state for comparing two entries
//!
//! Holds zero, one or two selected entries. A comparison is ready once a
//! second, distinct entry has been chosen to compare with the first.

use pvsnap_core_types::EntryId;

use crate::client::Client;
use crate::diff::EntryDiff;
use crate::errors::Result;
use crate::model::Entry;

#[derive(Debug, Clone, Default)]
pub struct ComparisonSession {
    left: Option<Entry>,
    right: Option<Entry>,
}

impl ComparisonSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `entry` as the original side, clearing any earlier pairing
    pub fn select(&mut self, entry: Entry) {
        self.left = Some(entry);
        self.right = None;
    }

    /// Pair `entry` with the selected entry
    ///
    /// Returns whether a comparison is now ready. Does nothing without a
    /// selection, or when `entry` is the selected entry itself.
    pub fn compare_with_selected(&mut self, entry: Entry) -> bool {
        match &self.left {
            Some(left) if left.id() != entry.id() => {
                self.right = Some(entry);
                true
            }
            _ => false,
        }
    }

    pub fn reset(&mut self) {
        self.left = None;
        self.right = None;
    }

    /// Whether the entry with `id` is on either side
    pub fn is_selected(&self, id: EntryId) -> bool {
        [&self.left, &self.right]
            .into_iter()
            .flatten()
            .any(|e| e.id() == id)
    }

    pub fn selected(&self) -> Option<&Entry> {
        self.left.as_ref()
    }

    pub fn is_ready(&self) -> bool {
        self.left.is_some() && self.right.is_some()
    }

    /// Diff the two sides, if both are chosen
    ///
    /// # Errors
    ///
    /// Propagates [`Client::compare`] errors.
    pub fn run(&self, client: &Client) -> Result<Option<EntryDiff>> {
        match (&self.left, &self.right) {
            (Some(left), Some(right)) => client.compare(left.clone(), right.clone()).map(Some),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Collection;

    #[test]
    fn test_ready_only_after_two_distinct_selections() {
        let a: Entry = Collection::new("a").into();
        let b: Entry = Collection::new("b").into();
        let mut session = ComparisonSession::new();

        assert!(!session.compare_with_selected(b.clone()));
        session.select(a.clone());
        assert!(!session.compare_with_selected(a.clone()));
        assert!(!session.is_ready());

        assert!(session.compare_with_selected(b.clone()));
        assert!(session.is_ready());
        assert!(session.is_selected(a.id()));
        assert!(session.is_selected(b.id()));

        session.reset();
        assert!(!session.is_selected(a.id()));
        assert!(session.selected().is_none());
    }
}
