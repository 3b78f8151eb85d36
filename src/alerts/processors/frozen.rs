//! Processor for alerts waiting to come within the horizon

use async_trait::async_trait;

use super::{beyond_horizon, resolve_by_date, today, AlertProcessor, ProcessError, ProcessOutcome};
use crate::alerts::record::{AlertRecord, AlertStatus};
use crate::context::AlertContext;

/// Leaves far-out alerts alone and resolves them once they come within range
#[derive(Debug, Default, Clone, Copy)]
pub struct FrozenProcessor;

#[async_trait]
impl AlertProcessor for FrozenProcessor {
    fn status(&self) -> AlertStatus {
        AlertStatus::Frozen
    }

    async fn process(
        &self,
        ctx: &AlertContext,
        record: AlertRecord,
    ) -> Result<ProcessOutcome, ProcessError> {
        if beyond_horizon(ctx, &record, today()) {
            tracing::debug!(alert_id = %record.id, "Flight still too far out, leaving frozen");
            return Ok(ProcessOutcome::Unchanged);
        }

        tracing::info!(alert_id = %record.id, "Frozen alert within horizon, resolving");
        resolve_by_date(ctx, record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::AlertStore;
    use crate::testing::{departing_on, harness, LookupBehavior};
    use chrono::Duration;

    #[tokio::test]
    async fn test_far_frozen_alert_is_silent() {
        let h = harness();
        let record = AlertRecord::queued(3, "LH1234", today() + Duration::days(30)).frozen();
        h.store.upsert(&record).await.unwrap();

        let outcome = FrozenProcessor.process(&h.ctx, record.clone()).await.unwrap();

        assert_eq!(outcome, ProcessOutcome::Unchanged);
        assert_eq!(h.lookup.calls(), 0);
        assert!(h.notifier.messages().is_empty());
        assert_eq!(h.store.get(&record.id).await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn test_entering_horizon_issues_one_lookup() {
        let h = harness();
        let date = today() + Duration::days(9);
        h.lookup.set("LH1234", LookupBehavior::Flights(vec![departing_on("9", "LH1234", date)]));
        let record = AlertRecord::queued(3, "LH1234", date).frozen();
        h.store.upsert(&record).await.unwrap();

        let outcome = FrozenProcessor.process(&h.ctx, record.clone()).await.unwrap();

        assert_eq!(outcome, ProcessOutcome::Activated);
        assert_eq!(h.lookup.calls(), 1);
        let stored = h.store.get(&record.id).await.unwrap().unwrap();
        assert_eq!(stored.status, AlertStatus::Active);
    }

    #[tokio::test]
    async fn test_lookup_failure_stays_frozen() {
        let h = harness();
        let record = AlertRecord::queued(3, "ZZ1", today()).frozen();
        h.store.upsert(&record).await.unwrap();

        let outcome = FrozenProcessor.process(&h.ctx, record.clone()).await.unwrap();

        assert_eq!(outcome, ProcessOutcome::Retained);
        let stored = h.store.get(&record.id).await.unwrap().unwrap();
        assert_eq!(stored.status, AlertStatus::Frozen);
    }
}
