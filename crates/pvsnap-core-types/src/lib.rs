//! Core types shared across pvsnap crates
//!
//! - **Identifiers**: `EntryId`, the 128-bit identity of every entry
//! - **Schema constants**: canonical field keys and event names for
//!   structured logging

pub mod id;
pub mod schema;

pub use id::EntryId;
