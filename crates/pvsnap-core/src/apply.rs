//! Apply engine: writing captured values back to the live system
//!
//! ## Contract
//!
//! - A `Setpoint` is written with exactly one `put`.
//! - A `Snapshot` is flattened into its setpoints in pre-order. Readbacks are
//!   never written.
//!   - `Sequential`: one `put` at a time, stopping at the first failure.
//!   - `Bulk`: one `put_many` covering every target.
//! - Anything else is rejected without I/O.
//!
//! ## Example
//!
//! ```
//! use pvsnap_core::{Client, ApplyMode, ApplyOutcome};
//! use pvsnap_core::control_layer::MemoryControlLayer;
//! use pvsnap_core::model::{Entry, Setpoint};
//! use pvsnap_core::store::MemoryStore;
//!
//! let client = Client::new(MemoryStore::new(), MemoryControlLayer::new());
//! let entry = Entry::from(Setpoint::new("MTR:01:VAL", 2.5));
//! let outcome = client.apply(&entry, ApplyMode::Bulk).unwrap();
//! assert!(matches!(outcome, ApplyOutcome::Completed(ref s) if s.len() == 1));
//! ```

use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::control_layer::TaskStatus;
use crate::errors::Result;
use crate::model::Entry;
use crate::{log_op_end, log_op_error, log_op_start};

/// How a snapshot's values are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyMode {
    /// One multi-target write; the service may parallelize
    #[default]
    Bulk,
    /// One write at a time in traversal order, halting at the first failure
    Sequential,
}

/// Result of an apply run
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    /// The entry cannot be applied; nothing was written
    Rejected { reason: String },
    /// Every write was issued; statuses may still report per-target failures
    Completed(Vec<TaskStatus>),
    /// A sequential run stopped early
    Halted {
        /// Writes that succeeded before the failure, in order
        applied: Vec<TaskStatus>,
        /// The failing write
        failure: TaskStatus,
    },
}

impl ApplyOutcome {
    /// Statuses of every write issued, including a halting failure
    pub fn statuses(&self) -> Vec<&TaskStatus> {
        match self {
            ApplyOutcome::Rejected { .. } => Vec::new(),
            ApplyOutcome::Completed(statuses) => statuses.iter().collect(),
            ApplyOutcome::Halted { applied, failure } => {
                applied.iter().chain(std::iter::once(failure)).collect()
            }
        }
    }

    /// Whether every issued write succeeded and nothing was rejected
    pub fn is_success(&self) -> bool {
        match self {
            ApplyOutcome::Completed(statuses) => statuses.iter().all(|s| !s.failed()),
            _ => false,
        }
    }
}

impl Client {
    /// Write the values held by `entry` to the live system
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` when a snapshot child identifier is missing
    /// from the store. Write failures are reported in the outcome.
    pub fn apply(&self, entry: &Entry, mode: ApplyMode) -> Result<ApplyOutcome> {
        log_op_start!("apply", entry_id = %entry.id(), mode = ?mode);
        let start = std::time::Instant::now();

        let outcome = self.apply_impl(entry, mode).map_err(|e| {
            log_op_error!(
                "apply",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "apply",
            duration_ms = start.elapsed().as_millis() as u64,
            status_count = outcome.statuses().len()
        );
        Ok(outcome)
    }

    /// [`Client::apply`] with the mode from configuration
    ///
    /// # Errors
    ///
    /// As [`Client::apply`].
    pub fn apply_default(&self, entry: &Entry) -> Result<ApplyOutcome> {
        let mode = if self.config().apply.sequential {
            ApplyMode::Sequential
        } else {
            ApplyMode::Bulk
        };
        self.apply(entry, mode)
    }

    fn apply_impl(&self, entry: &Entry, mode: ApplyMode) -> Result<ApplyOutcome> {
        match entry {
            Entry::Setpoint(sp) => {
                let status = self.control_layer().put(&sp.pv_name, &sp.data);
                return Ok(ApplyOutcome::Completed(vec![status]));
            }
            Entry::Snapshot(_) => {}
            other => {
                tracing::info!(kind = %other.kind(), "only snapshots and setpoints can be applied");
                return Ok(ApplyOutcome::Rejected {
                    reason: format!("{} entries cannot be applied", other.kind()),
                });
            }
        }

        let targets = self.gather_writable(entry)?;
        if targets.is_empty() {
            tracing::debug!("no writable values found");
            return Ok(ApplyOutcome::Completed(Vec::new()));
        }

        match mode {
            ApplyMode::Bulk => Ok(ApplyOutcome::Completed(
                self.control_layer().put_many(&targets),
            )),
            ApplyMode::Sequential => {
                let mut applied = Vec::with_capacity(targets.len());
                for (pv_name, value) in &targets {
                    tracing::debug!(pv_name = %pv_name, value = %value, "putting value");
                    let status = self.control_layer().put(pv_name, value);
                    if status.failed() {
                        tracing::warn!(
                            pv_name = %pv_name,
                            value = %value,
                            "write failed, terminating put sequence"
                        );
                        return Ok(ApplyOutcome::Halted {
                            applied,
                            failure: status,
                        });
                    }
                    applied.push(status);
                }
                Ok(ApplyOutcome::Completed(applied))
            }
        }
    }
}
