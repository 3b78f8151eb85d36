//! Alert lifecycle
//!
//! An alert moves `queued -> frozen -> active -> removed`, never backwards.
//! Each state has a processor deciding the next step for one record; the
//! sweepers in [`crate::sweep`] run them over whole partitions.

pub mod messages;
pub mod processors;
pub mod record;

pub use processors::{
    ActiveProcessor, AlertProcessor, FrozenProcessor, ProcessError, ProcessOutcome,
    QueuedProcessor, RemovalReason,
};
pub use record::{alert_id, AlertRecord, AlertStatus};
