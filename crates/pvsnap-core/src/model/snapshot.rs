use std::collections::HashSet;

use chrono::{DateTime, Utc};
use pvsnap_core_types::EntryId;
use serde::{Deserialize, Serialize};

use super::entry::{Child, Entry, Nestable};
use super::readback::Readback;
use super::tags::TagSet;

/// Captured setpoints and readbacks for one collection at one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: EntryId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub creation_time: DateTime<Utc>,
    #[serde(default)]
    pub children: Vec<Child>,
    #[serde(default, with = "super::tags::tag_set_pairs")]
    pub tags: TagSet,
    /// Collection this snapshot was taken from
    #[serde(default)]
    pub origin_collection: Option<Box<Child>>,
    /// Global auxiliary readbacks, kept apart from `children`
    #[serde(default)]
    pub meta_pvs: Vec<Readback>,
}

impl Snapshot {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: EntryId::new(),
            title: title.into(),
            description: String::new(),
            creation_time: Utc::now(),
            children: Vec::new(),
            tags: TagSet::new(),
            origin_collection: None,
            meta_pvs: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_child(mut self, child: impl Into<Child>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Captured values held by this snapshot
    ///
    /// Counts resolved leaves at any depth, distinct readbacks embedded in
    /// setpoints (by PV name), and meta PVs. Identifier children are not
    /// counted.
    pub fn leaf_count(&self) -> usize {
        fn count<'a>(children: &'a [Child], embedded: &mut HashSet<&'a str>) -> usize {
            children
                .iter()
                .filter_map(Child::entry)
                .map(|entry| match entry {
                    Entry::Snapshot(s) => count(&s.children, embedded) + s.meta_pvs.len(),
                    Entry::Collection(c) => count(&c.children, embedded),
                    Entry::Setpoint(sp) => {
                        let rb = sp.readback.as_ref();
                        1 + usize::from(rb.is_some_and(|rb| embedded.insert(rb.pv_name.as_str())))
                    }
                    Entry::Parameter(_) | Entry::Readback(_) => 1,
                })
                .sum()
        }
        count(&self.children, &mut HashSet::new()) + self.meta_pvs.len()
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new("")
    }
}

impl Nestable for Snapshot {
    fn children(&self) -> &[Child] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut Vec<Child> {
        &mut self.children
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Collection;

    #[test]
    fn test_resolved_origin_survives_json() {
        let origin = Collection::new("origin");
        let mut snapshot = Snapshot::new("snap");
        snapshot.origin_collection = Some(Box::new(Child::Resolved(origin.clone().into())));

        let json = serde_json::to_string(&snapshot).unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
        assert_eq!(back.origin_collection.as_deref().map(Child::id), Some(origin.id));
    }
}
