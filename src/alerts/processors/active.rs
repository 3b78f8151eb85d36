//! Processor for alerts tracking a resolved flight

use async_trait::async_trait;
use chrono::Utc;

use super::{resolve_by_date, AlertProcessor, ProcessError, ProcessOutcome, RemovalReason};
use crate::alerts::messages;
use crate::alerts::record::{AlertRecord, AlertStatus};
use crate::context::AlertContext;
use crate::flight::{compare, render_arrival, render_update};
use crate::lookup::LookupError;

/// Re-checks a tracked flight and reports what changed.
///
/// A lookup saying the code has no data, or a flight that is no longer
/// listed, ends the alert. Transport and decode failures leave it active for
/// the next tick.
#[derive(Debug, Default, Clone, Copy)]
pub struct ActiveProcessor;

#[async_trait]
impl AlertProcessor for ActiveProcessor {
    fn status(&self) -> AlertStatus {
        AlertStatus::Active
    }

    async fn process(
        &self,
        ctx: &AlertContext,
        record: AlertRecord,
    ) -> Result<ProcessOutcome, ProcessError> {
        let Some(stored) = record.snapshot.clone() else {
            tracing::warn!(alert_id = %record.id, "Active alert without snapshot, resolving by date");
            return resolve_by_date(ctx, record).await;
        };
        let code = stored.flight_code.as_str();

        let fresh = match ctx.lookup.find_by_id(code, &stored.flight_id).await {
            Ok(Some(fresh)) => fresh,
            Ok(None) | Err(LookupError::NoData(_)) => {
                ctx.store.delete(&record.id).await?;
                ctx.notify(record.chat_id, &messages::lost_track(code)).await;
                tracing::info!(alert_id = %record.id, "Flight no longer listed, alert removed");
                return Ok(ProcessOutcome::Removed(RemovalReason::LostTrack));
            }
            Err(e) => return Err(e.into()),
        };

        let now = Utc::now();

        if fresh.has_arrived() {
            ctx.store.delete(&record.id).await?;
            ctx.notify(record.chat_id, &render_arrival(&fresh, now)).await;
            tracing::info!(alert_id = %record.id, "Flight arrived, alert removed");
            return Ok(ProcessOutcome::Removed(RemovalReason::Arrived));
        }

        if fresh.is_status_unknown() {
            ctx.store.delete(&record.id).await?;
            ctx.notify(record.chat_id, &messages::status_unknown(code)).await;
            tracing::warn!(alert_id = %record.id, "Flight status unknown, alert removed");
            return Ok(ProcessOutcome::Removed(RemovalReason::StatusUnknown));
        }

        let diff = compare(&stored, &fresh, ctx.policy.diff_tolerance_secs).map_err(|e| {
            tracing::error!(alert_id = %record.id, error = %e, "Snapshot comparison failed");
            e
        })?;

        if diff.is_empty() {
            tracing::debug!(alert_id = %record.id, "No change");
            return Ok(ProcessOutcome::Unchanged);
        }

        let message = render_update(&fresh, &diff, now);
        let updated = record.activated(fresh);
        ctx.store.upsert(&updated).await?;
        if let Some(text) = message {
            ctx.notify(updated.chat_id, &text).await;
        }
        tracing::info!(
            alert_id = %updated.id,
            changed = ?diff.fields().collect::<Vec<_>>(),
            "Flight changed, snapshot updated"
        );
        Ok(ProcessOutcome::Updated)
    }
}
