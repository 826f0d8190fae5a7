pub mod collection;
pub mod entry;
pub mod parameter;
pub mod readback;
pub mod setpoint;
pub mod snapshot;
pub mod tags;
pub mod value;

pub use collection::Collection;
pub use entry::{Child, Entry, EntryKind, Nestable, Root};
pub use parameter::Parameter;
pub use readback::Readback;
pub use setpoint::Setpoint;
pub use snapshot::Snapshot;
pub use tags::{TagDef, TagGroup, TagSet};
pub use value::{EpicsData, EpicsValue, Severity, Status};
