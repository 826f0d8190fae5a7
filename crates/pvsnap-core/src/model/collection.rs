use chrono::{DateTime, Utc};
use pvsnap_core_types::EntryId;
use serde::{Deserialize, Serialize};

use super::entry::{Child, Nestable};
use super::tags::TagSet;

/// A user-curated group of parameters and nested collections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: EntryId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub creation_time: DateTime<Utc>,
    #[serde(default)]
    pub children: Vec<Child>,
    #[serde(default, with = "super::tags::tag_set_pairs")]
    pub tags: TagSet,
}

impl Collection {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: EntryId::new(),
            title: title.into(),
            description: String::new(),
            creation_time: Utc::now(),
            children: Vec::new(),
            tags: TagSet::new(),
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

    pub fn with_tags(mut self, tags: TagSet) -> Self {
        self.tags = tags;
        self
    }
}

impl Nestable for Collection {
    fn children(&self) -> &[Child] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut Vec<Child> {
        &mut self.children
    }
}
