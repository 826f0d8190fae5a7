//! Tag groups and tag sets
//!
//! A `TagDef` describes the available tag groups and their choices. A
//! `TagSet` records which tags are active on one entry.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::errors::{Result, SnapError};

/// Active tags on an entry: tag-group index to active tag indices
pub type TagSet = BTreeMap<u32, BTreeSet<u32>>;

/// Serde adapter writing a `TagSet` as `[group, [tags]]` pairs
///
/// Entries are deserialized through buffering enums, which cannot turn
/// string map keys back into integers.
pub mod tag_set_pairs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::BTreeSet;

    use super::TagSet;

    pub fn serialize<S: Serializer>(tags: &TagSet, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(tags.iter())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TagSet, D::Error> {
        let pairs: Vec<(u32, BTreeSet<u32>)> = Vec::deserialize(deserializer)?;
        Ok(pairs.into_iter().collect())
    }
}

/// One named category of related tags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagGroup {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Tag index to tag label
    pub choices: BTreeMap<u32, String>,
}

impl TagGroup {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            choices: BTreeMap::new(),
        }
    }

    pub fn with_choice(mut self, index: u32, label: impl Into<String>) -> Self {
        self.choices.insert(index, label.into());
        self
    }
}

/// Definition of all tag groups known to a store
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagDef {
    groups: BTreeMap<u32, TagGroup>,
}

impl TagDef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(mut self, index: u32, group: TagGroup) -> Self {
        self.groups.insert(index, group);
        self
    }

    pub fn group(&self, index: u32) -> Option<&TagGroup> {
        self.groups.get(&index)
    }

    pub fn groups(&self) -> impl Iterator<Item = (&u32, &TagGroup)> {
        self.groups.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Human-readable (group name, tag labels) pairs for a tag set
    ///
    /// Unknown groups and tags are skipped.
    pub fn tag_names(&self, tags: &TagSet) -> Vec<(String, Vec<String>)> {
        tags.iter()
            .filter_map(|(group_idx, active)| {
                let group = self.groups.get(group_idx)?;
                let labels = active
                    .iter()
                    .filter_map(|t| group.choices.get(t).cloned())
                    .collect();
                Some((group.name.clone(), labels))
            })
            .collect()
    }

    /// Check that every group and tag in `tags` is defined
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` naming the first unknown group or tag.
    pub fn validate(&self, tags: &TagSet) -> Result<()> {
        for (group_idx, active) in tags {
            let group = self
                .groups
                .get(group_idx)
                .ok_or_else(|| SnapError::InvalidInput {
                    reason: format!("unknown tag group {}", group_idx),
                })?;
            if let Some(tag) = active.iter().find(|t| !group.choices.contains_key(t)) {
                return Err(SnapError::InvalidInput {
                    reason: format!("unknown tag {} in group '{}'", tag, group.name),
                });
            }
        }
        Ok(())
    }
}
