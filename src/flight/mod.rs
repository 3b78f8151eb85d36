//! Flight snapshots and the comparator that decides what changed
//!
//! A [`FlightSnapshot`] is a point-in-time capture of one flight as reported
//! by the lookup service. Two snapshots of the same flight are compared with
//! [`compare`], and the resulting [`Diff`] is turned into at most one chat
//! message by [`render_update`].

pub mod diff;
pub mod render;
pub mod snapshot;

pub use diff::{compare, Diff, DiffError, DEFAULT_TOLERANCE_SECS};
pub use render::{humanize, render_arrival, render_update, RelativeTime};
pub use snapshot::{FieldValue, FlightSnapshot, SnapshotField, SCHEMA_VERSION};
