//! Per-state alert processors

pub mod active;
pub mod frozen;
pub mod queued;

pub use active::ActiveProcessor;
pub use frozen::FrozenProcessor;
pub use queued::QueuedProcessor;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::Serialize;

use super::messages;
use super::record::{AlertRecord, AlertStatus};
use crate::context::AlertContext;
use crate::flight::DiffError;
use crate::lookup::LookupError;
use crate::store::StoreError;

/// Decision logic for records in one status
#[async_trait]
pub trait AlertProcessor: Send + Sync + 'static {
    /// The status partition this processor owns
    fn status(&self) -> AlertStatus;

    /// Process one record and apply the outcome to the store
    async fn process(
        &self,
        ctx: &AlertContext,
        record: AlertRecord,
    ) -> Result<ProcessOutcome, ProcessError>;
}

/// Why a record was removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalReason {
    NotFound,
    Arrived,
    StatusUnknown,
    LostTrack,
}

/// What happened to a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessOutcome {
    /// Nothing to do this tick
    Unchanged,
    /// Lookup failed; kept in place for the next tick
    Retained,
    Frozen,
    Activated,
    /// Active snapshot replaced after a change
    Updated,
    Removed(RemovalReason),
}

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    #[error("Snapshot comparison failed: {0}")]
    Diff(#[from] DiffError),
}

/// Today's date in UTC
pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Whether `record` is still too far out to be resolved
pub(crate) fn beyond_horizon(ctx: &AlertContext, record: &AlertRecord, today: NaiveDate) -> bool {
    record.days_until(today) > ctx.policy.freeze_horizon_days
}

/// Resolve a not-yet-active record by its date: activate, remove, or keep for retry
pub(crate) async fn resolve_by_date(
    ctx: &AlertContext,
    record: AlertRecord,
) -> Result<ProcessOutcome, ProcessError> {
    let code = record.flight_code.as_str();
    let date = record.target_date;

    let found = match ctx.lookup.find_by_date(code, date).await {
        Ok(found) => found,
        Err(e) => {
            tracing::warn!(alert_id = %record.id, error = %e, "Lookup failed, keeping alert for retry");
            ctx.notify(record.chat_id, &messages::lookup_failed(code, date)).await;
            return Ok(ProcessOutcome::Retained);
        }
    };

    let Some(snapshot) = found else {
        ctx.store.delete(&record.id).await?;
        ctx.notify(record.chat_id, &messages::not_found(code, date)).await;
        tracing::info!(alert_id = %record.id, "Flight not found for date, alert removed");
        return Ok(ProcessOutcome::Removed(RemovalReason::NotFound));
    };

    if snapshot.has_arrived() {
        ctx.store.delete(&record.id).await?;
        ctx.notify(record.chat_id, &messages::already_arrived(&snapshot)).await;
        tracing::info!(alert_id = %record.id, "Flight already arrived, alert removed");
        return Ok(ProcessOutcome::Removed(RemovalReason::Arrived));
    }

    if snapshot.is_status_unknown() {
        ctx.store.delete(&record.id).await?;
        ctx.notify(record.chat_id, &messages::status_unknown(code)).await;
        tracing::warn!(alert_id = %record.id, "Flight status unknown, alert removed");
        return Ok(ProcessOutcome::Removed(RemovalReason::StatusUnknown));
    }

    let text = messages::now_tracking(&snapshot);
    let active = record.activated(snapshot);
    ctx.store.upsert(&active).await?;
    ctx.notify(active.chat_id, &text).await;
    tracing::info!(alert_id = %active.id, "Alert set to active");
    Ok(ProcessOutcome::Activated)
}
