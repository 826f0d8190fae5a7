use chrono::{DateTime, Utc};
use pvsnap_core_types::EntryId;
use serde::{Deserialize, Serialize};

use super::parameter::Parameter;
use super::readback::Readback;
use super::tags::TagSet;
use super::value::{EpicsData, EpicsValue, Severity, Status};

/// A captured, writable value plus the readback taken alongside it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setpoint {
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
    pub readback: Option<Box<Readback>>,
    #[serde(default, with = "super::tags::tag_set_pairs")]
    pub tags: TagSet,
}

impl Setpoint {
    pub fn new(pv_name: impl Into<String>, data: impl Into<EpicsValue>) -> Self {
        Self {
            id: EntryId::new(),
            description: String::new(),
            creation_time: Utc::now(),
            pv_name: pv_name.into(),
            data: data.into(),
            status: Status::NoAlarm,
            severity: Severity::NoAlarm,
            readback: None,
            tags: TagSet::new(),
        }
    }

    pub fn with_readback(mut self, readback: Readback) -> Self {
        self.readback = Some(Box::new(readback));
        self
    }

    /// Capture `reading` for a writable `param`
    pub fn from_parameter(param: &Parameter, reading: EpicsData, readback: Option<Readback>) -> Self {
        Self {
            id: EntryId::new(),
            description: param.description.clone(),
            creation_time: Utc::now(),
            pv_name: param.pv_name.clone(),
            data: reading.data,
            status: reading.status,
            severity: reading.severity,
            readback: readback.map(Box::new),
            tags: param.tags.clone(),
        }
    }
}
