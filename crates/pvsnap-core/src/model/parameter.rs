use chrono::{DateTime, Utc};
use pvsnap_core_types::EntryId;
use serde::{Deserialize, Serialize};

use super::tags::TagSet;

/// A control point: one PV plus how to read it back and compare it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub id: EntryId,
    #[serde(default)]
    pub description: String,
    pub creation_time: DateTime<Utc>,
    pub pv_name: String,
    /// Paired read-only channel, described as its own parameter
    #[serde(default)]
    pub readback: Option<Box<Parameter>>,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub abs_tolerance: Option<f64>,
    #[serde(default)]
    pub rel_tolerance: Option<f64>,
    #[serde(default, with = "super::tags::tag_set_pairs")]
    pub tags: TagSet,
}

impl Parameter {
    pub fn new(pv_name: impl Into<String>) -> Self {
        Self {
            id: EntryId::new(),
            description: String::new(),
            creation_time: Utc::now(),
            pv_name: pv_name.into(),
            readback: None,
            read_only: false,
            abs_tolerance: None,
            rel_tolerance: None,
            tags: TagSet::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_readback(mut self, readback: Parameter) -> Self {
        self.readback = Some(Box::new(readback));
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn with_tolerances(mut self, abs_tolerance: Option<f64>, rel_tolerance: Option<f64>) -> Self {
        self.abs_tolerance = abs_tolerance;
        self.rel_tolerance = rel_tolerance;
        self
    }
}
