//! Processor for newly registered alerts

use async_trait::async_trait;

use super::{beyond_horizon, resolve_by_date, today, AlertProcessor, ProcessError, ProcessOutcome};
use crate::alerts::messages;
use crate::alerts::record::{AlertRecord, AlertStatus};
use crate::context::AlertContext;

/// Freezes far-out alerts and resolves the rest
#[derive(Debug, Default, Clone, Copy)]
pub struct QueuedProcessor;

#[async_trait]
impl AlertProcessor for QueuedProcessor {
    fn status(&self) -> AlertStatus {
        AlertStatus::Queued
    }

    async fn process(
        &self,
        ctx: &AlertContext,
        record: AlertRecord,
    ) -> Result<ProcessOutcome, ProcessError> {
        tracing::debug!(alert_id = %record.id, "Checking queued alert");

        if beyond_horizon(ctx, &record, today()) {
            let frozen = record.frozen();
            ctx.store.upsert(&frozen).await?;
            ctx.notify(
                frozen.chat_id,
                &messages::too_far(&frozen.flight_code, frozen.target_date),
            )
            .await;
            tracing::info!(alert_id = %frozen.id, "Flight too far out, alert set to frozen");
            return Ok(ProcessOutcome::Frozen);
        }

        resolve_by_date(ctx, record).await
    }
}
