use chrono::{DateTime, Utc};
use pvsnap_core_types::EntryId;
use serde::{Deserialize, Serialize};

use super::parameter::Parameter;
use super::tags::TagSet;
use super::value::{EpicsData, EpicsValue, Severity, Status};

/// A captured, read-only value
///
/// Tolerances are copied from the originating parameter so later live-vs-stored
/// comparisons do not need the parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Readback {
    pub id: EntryId,
    #[serde(default)]
    pub description: String,
    pub creation_time: DateTime<Utc>,
    pub pv_name: String,
    #[serde(default)]
    pub data: EpicsValue,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub abs_tolerance: Option<f64>,
    #[serde(default)]
    pub rel_tolerance: Option<f64>,
    #[serde(default, with = "super::tags::tag_set_pairs")]
    pub tags: TagSet,
}

impl Readback {
    pub fn new(pv_name: impl Into<String>, data: impl Into<EpicsValue>) -> Self {
        Self {
            id: EntryId::new(),
            description: String::new(),
            creation_time: Utc::now(),
            pv_name: pv_name.into(),
            data: data.into(),
            status: Status::NoAlarm,
            severity: Severity::NoAlarm,
            abs_tolerance: None,
            rel_tolerance: None,
            tags: TagSet::new(),
        }
    }

    /// Capture `reading` for `param`, carrying over its description and tolerances
    pub fn from_parameter(param: &Parameter, reading: EpicsData) -> Self {
        Self {
            id: EntryId::new(),
            description: param.description.clone(),
            creation_time: Utc::now(),
            pv_name: param.pv_name.clone(),
            data: reading.data,
            status: reading.status,
            severity: reading.severity,
            abs_tolerance: param.abs_tolerance,
            rel_tolerance: param.rel_tolerance,
            tags: param.tags.clone(),
        }
    }

    /// Whether `live` is within this readback's tolerances of the stored value
    pub fn is_close_to(&self, live: &EpicsValue) -> bool {
        crate::tolerance::within_tolerance(
            &self.data,
            live,
            self.rel_tolerance.unwrap_or(0.0),
            self.abs_tolerance.unwrap_or(0.0),
        )
    }
}
