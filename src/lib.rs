//! Flightwatch: flight alert lifecycle engine
//!
//! Users register an alert for a flight code on a date. Three sweepers move
//! each alert through its lifecycle:
//!
//! - **Queued**: newly registered; frozen if too far out, otherwise resolved
//!   to a concrete flight
//! - **Frozen**: waiting until the date comes within the lookup horizon
//! - **Active**: tracking a resolved flight and messaging the user when its
//!   status or times change, until it lands
//!
//! Each sweep fetches one status partition, processes every record on a
//! bounded worker pool and returns at its deadline whether or not every
//! task has finished.
//!
//! # Example
//!
//! ```no_run
//! use flightwatch::alerts::{AlertStatus, QueuedProcessor};
//! use flightwatch::config::Settings;
//! use flightwatch::context::AlertContext;
//! use flightwatch::lookup::Fr24Client;
//! use flightwatch::notify::LogNotifier;
//! use flightwatch::store::MemoryStore;
//! use flightwatch::sweep::Sweeper;
//! use std::sync::Arc;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = Settings::default();
//! let ctx = AlertContext::new(
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(Fr24Client::new(settings.lookup_config())?),
//!     Arc::new(LogNotifier),
//!     settings.policy,
//! );
//! let sweeper = Sweeper::new(ctx, Arc::new(QueuedProcessor), settings.sweeper(AlertStatus::Queued));
//! let report = sweeper.run_once().await?;
//! println!("activated {}", report.activated);
//! # Ok(())
//! # }
//! ```

pub mod alerts;
pub mod api;
pub mod config;
pub mod context;
pub mod flight;
pub mod lookup;
pub mod notify;
pub mod store;
pub mod sweep;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use alerts::{AlertRecord, AlertStatus, ProcessOutcome};
pub use context::AlertContext;
pub use flight::{compare, Diff, FlightSnapshot};
pub use store::{AlertStore, StoreError};
pub use sweep::{run_sweep, SweepReport, Sweeper};
