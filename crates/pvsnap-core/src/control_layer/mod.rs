//! Live-value service interface
//!
//! Reads and writes go through [`ControlLayer`]. Bulk calls are one logical
//! request; the service may fan out internally.

pub mod memory;

use std::sync::Arc;

use crate::errors::{Result, SnapError};
use crate::model::{EpicsData, EpicsValue};

pub use memory::MemoryControlLayer;

/// Outcome of one write
///
/// Writes complete before the status is returned, so inspection never blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskStatus {
    pub pv_name: String,
    pub value: EpicsValue,
    error: Option<SnapError>,
}

impl TaskStatus {
    pub fn success(pv_name: impl Into<String>, value: EpicsValue) -> Self {
        Self {
            pv_name: pv_name.into(),
            value,
            error: None,
        }
    }

    pub fn failure(pv_name: impl Into<String>, value: EpicsValue, reason: impl Into<String>) -> Self {
        let pv_name = pv_name.into();
        let error = SnapError::WriteFailure {
            pv_name: pv_name.clone(),
            value: value.to_string(),
            reason: reason.into(),
        };
        Self {
            pv_name,
            value,
            error: Some(error),
        }
    }

    /// Whether the write failed
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }

    /// The failure, if any
    pub fn exception(&self) -> Option<&SnapError> {
        self.error.as_ref()
    }
}

/// Access to live PV values
pub trait ControlLayer: Send + Sync {
    /// Read one PV
    ///
    /// # Errors
    ///
    /// Returns `UnreadableValue` when the PV cannot be read.
    fn get(&self, pv_name: &str) -> Result<EpicsData>;

    /// Read many PVs in one request
    ///
    /// Never fails as a whole: each position holds that PV's result.
    fn get_many(&self, pv_names: &[String]) -> Vec<Result<EpicsData>> {
        pv_names.iter().map(|pv| self.get(pv)).collect()
    }

    /// Write one PV and wait for completion
    fn put(&self, pv_name: &str, value: &EpicsValue) -> TaskStatus;

    /// Write many PVs in one request, one status per target
    fn put_many(&self, targets: &[(String, EpicsValue)]) -> Vec<TaskStatus> {
        targets.iter().map(|(pv, value)| self.put(pv, value)).collect()
    }
}

impl<C: ControlLayer + ?Sized> ControlLayer for Arc<C> {
    fn get(&self, pv_name: &str) -> Result<EpicsData> {
        (**self).get(pv_name)
    }

    fn get_many(&self, pv_names: &[String]) -> Vec<Result<EpicsData>> {
        (**self).get_many(pv_names)
    }

    fn put(&self, pv_name: &str, value: &EpicsValue) -> TaskStatus {
        (**self).put(pv_name, value)
    }

    fn put_many(&self, targets: &[(String, EpicsValue)]) -> Vec<TaskStatus> {
        (**self).put_many(targets)
    }
}
