//! Timed, concurrent sweeps over the alert partitions

pub mod engine;
pub mod sweeper;

pub use engine::{run_sweep, SweepError, SweepReport, WorkerPool};
pub use sweeper::{ReportHandle, Sweeper};
