//! pvsnap core - snapshot and restore of process-variable values
//!
//! This crate provides the entry graph and the operations over it:
//! - Entry models (collections, snapshots, parameters, setpoints, readbacks)
//!   with identifier-or-entry children
//! - Reference resolution against an entry store
//! - Leaf gathering, snapshot acquisition and apply against a control layer
//! - Field-level diffing of two entry graphs
//! - A lazily-resolved tree view for browsing
//!
//! Storage and live I/O sit behind the [`store::EntryStore`] and
//! [`control_layer::ControlLayer`] traits; in-memory implementations of both
//! are included.

pub mod apply;
pub mod client;
pub mod config;
pub mod control_layer;
pub mod diff;
pub mod errors;
pub mod gather;
pub mod logging_facility;
pub mod model;
pub mod resolve;
pub mod session;
pub mod snap;
pub mod store;
pub mod tolerance;
pub mod tree;

// Re-export commonly used types
pub use apply::{ApplyMode, ApplyOutcome};
pub use client::Client;
pub use config::ClientConfig;
pub use diff::{DiffItem, EntryDiff};
pub use errors::{ExError, ExErrorKind, Result, SnapError};
pub use model::{Child, Collection, Entry, EntryKind, Parameter, Readback, Setpoint, Snapshot};
pub use pvsnap_core_types::EntryId;
pub use session::ComparisonSession;
pub use tree::{EntryTree, NodeId};
