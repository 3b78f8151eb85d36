//! One sweep: fetch a partition, process every record with bounded concurrency

use chrono::{DateTime, Utc};
use dashmap::DashSet;
use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinError;
use tokio::time::{timeout_at, Instant};

use crate::alerts::{AlertProcessor, AlertStatus, ProcessError, ProcessOutcome};
use crate::context::AlertContext;
use crate::store::StoreError;

/// Worker slots and the ids currently being processed, shared by every
/// sweep of one sweeper.
///
/// A record stays claimed until its task ends, even when the sweep that
/// spawned it has already returned. Later sweeps skip claimed records.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    in_flight: Arc<DashSet<String>>,
}

impl WorkerPool {
    pub fn new(size: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(size)),
            in_flight: Arc::new(DashSet::new()),
        }
    }

    /// Records whose task is still running
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    fn claim(&self, id: &str) -> Option<Claim> {
        self.in_flight.insert(id.to_string()).then(|| Claim {
            in_flight: Arc::clone(&self.in_flight),
            id: id.to_string(),
        })
    }
}

/// Releases a record id when its task ends, panics included
struct Claim {
    in_flight: Arc<DashSet<String>>,
    id: String,
}

impl Drop for Claim {
    fn drop(&mut self) {
        self.in_flight.remove(&self.id);
    }
}

/// Result of a single record's task
enum TaskResult {
    Processed(Result<ProcessOutcome, ProcessError>),
    /// No worker slot before the deadline; left for the next tick
    Skipped,
}

/// Counters for one sweep
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub status: AlertStatus,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    /// Records in the partition at fetch time
    pub fetched: usize,
    pub unchanged: usize,
    pub retained: usize,
    pub frozen: usize,
    pub activated: usize,
    pub updated: usize,
    pub removed: usize,
    /// Tasks that returned an error or panicked
    pub failed: usize,
    /// Tasks not finished by the deadline
    pub abandoned: usize,
    /// Records skipped because a task from an earlier sweep still holds them
    pub busy: usize,
}

impl SweepReport {
    fn new(status: AlertStatus, fetched: usize) -> Self {
        Self {
            status,
            started_at: Utc::now(),
            elapsed_ms: 0,
            fetched,
            unchanged: 0,
            retained: 0,
            frozen: 0,
            activated: 0,
            updated: 0,
            removed: 0,
            failed: 0,
            abandoned: 0,
            busy: 0,
        }
    }

    /// Tasks that finished without error
    pub fn succeeded(&self) -> usize {
        self.unchanged + self.retained + self.frozen + self.activated + self.updated + self.removed
    }

    fn count(&mut self, outcome: ProcessOutcome) {
        match outcome {
            ProcessOutcome::Unchanged => self.unchanged += 1,
            ProcessOutcome::Retained => self.retained += 1,
            ProcessOutcome::Frozen => self.frozen += 1,
            ProcessOutcome::Activated => self.activated += 1,
            ProcessOutcome::Updated => self.updated += 1,
            ProcessOutcome::Removed(_) => self.removed += 1,
        }
    }

    fn record(&mut self, joined: Result<(String, TaskResult), JoinError>) {
        match joined {
            Ok((_, TaskResult::Processed(Ok(outcome)))) => self.count(outcome),
            Ok((alert_id, TaskResult::Processed(Err(e)))) => {
                self.failed += 1;
                tracing::error!(alert_id = %alert_id, error = %e, "Alert processing failed");
            }
            Ok((alert_id, TaskResult::Skipped)) => {
                self.abandoned += 1;
                tracing::debug!(alert_id = %alert_id, "No worker slot before deadline");
            }
            Err(e) => {
                self.failed += 1;
                tracing::error!(error = %e, "Alert task panicked");
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SweepError {
    #[error("Failed to fetch alerts: {0}")]
    Fetch(#[from] StoreError),
}

/// Run `processor` over every record currently in its partition.
///
/// At most `pool`'s size tasks run at once. After `sweep_timeout` the sweep
/// returns; tasks still running keep going in the background and tasks still
/// waiting for a slot give up. The deadline covers the fetch too.
pub async fn run_sweep(
    ctx: &AlertContext,
    processor: Arc<dyn AlertProcessor>,
    pool: &WorkerPool,
    sweep_timeout: Duration,
) -> Result<SweepReport, SweepError> {
    let started = Instant::now();
    let deadline = started + sweep_timeout;
    let status = processor.status();

    let records = match timeout_at(deadline, ctx.store.find_all(status)).await {
        Ok(records) => records?,
        Err(_) => {
            return Err(SweepError::Fetch(StoreError::Unavailable(
                "listing alerts timed out".to_string(),
            )))
        }
    };
    let mut report = SweepReport::new(status, records.len());

    if records.is_empty() {
        tracing::debug!(%status, "No alerts to process");
        return Ok(report);
    }
    tracing::info!(%status, count = records.len(), "Processing alerts");

    let mut tasks = FuturesUnordered::new();
    for record in records {
        let Some(claim) = pool.claim(&record.id) else {
            report.busy += 1;
            tracing::debug!(alert_id = %record.id, "Alert still held by an earlier task");
            continue;
        };
        let ctx = ctx.clone();
        let processor = Arc::clone(&processor);
        let permits = Arc::clone(&pool.permits);

        tasks.push(tokio::spawn(async move {
            let _claim = claim;
            let alert_id = record.id.clone();
            let _permit = match timeout_at(deadline, permits.acquire_owned()).await {
                Ok(Ok(permit)) => permit,
                Ok(Err(_)) | Err(_) => return (alert_id, TaskResult::Skipped),
            };
            let result = processor.process(&ctx, record).await;
            (alert_id, TaskResult::Processed(result))
        }));
    }

    let drain = async {
        while let Some(joined) = tasks.next().await {
            report.record(joined);
        }
    };

    if timeout_at(deadline, drain).await.is_err() {
        // Dropping the handles detaches the tasks without cancelling them
        report.abandoned += tasks.len();
        tracing::warn!(
            %status,
            abandoned = tasks.len(),
            "Sweep deadline reached before all alerts finished"
        );
    }
    drop(tasks);

    report.elapsed_ms = started.elapsed().as_millis() as u64;
    tracing::info!(
        %status,
        fetched = report.fetched,
        succeeded = report.succeeded(),
        failed = report.failed,
        abandoned = report.abandoned,
        busy = report.busy,
        elapsed_ms = report.elapsed_ms,
        "Sweep finished"
    );

    Ok(report)
}
