//! Structural diff engine.
//!
//! Compares two entry graphs field by field and produces an ordered list of
//! (path, original value, new value) records.
//!
//! ## Entry point
//!
//! ```ignore
//! let diff = client.compare(left, right)?;
//! println!("{}", pvsnap_core::diff::render_human_summary(&diff));
//! ```
//!
//! ## Guarantees
//!
//! - Numeric equality is exact. Tolerance checks live in [`crate::tolerance`].
//! - Lists are compared by position, never by identifier.
//! - Entries of differing runtime types yield one record and no descent.

pub mod compare;
pub mod engine;
pub mod fields;
pub mod human_summary;
pub mod model;

pub use engine::walk_find_diff;
pub use fields::{FieldSet, FieldValue, Node};
pub use human_summary::render_human_summary;
pub use model::{DiffItem, DiffValue, EntryDiff, PathSegment};
