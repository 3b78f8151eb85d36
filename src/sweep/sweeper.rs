//! Periodic sweeper driving one processor

use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};

use super::engine::{run_sweep, SweepError, SweepReport, WorkerPool};
use crate::alerts::{AlertProcessor, AlertStatus};
use crate::config::SweeperSettings;
use crate::context::AlertContext;

/// Shared view of a sweeper's most recent report
pub type ReportHandle = Arc<RwLock<Option<SweepReport>>>;

/// Runs one processor over its partition every `interval`.
///
/// The worker pool outlives individual sweeps, so tasks abandoned by a
/// timed-out sweep still hold their slots and their records when the next
/// one starts.
pub struct Sweeper {
    ctx: AlertContext,
    processor: Arc<dyn AlertProcessor>,
    settings: SweeperSettings,
    pool: WorkerPool,
    last_report: ReportHandle,
    shutdown_tx: Option<mpsc::Sender<()>>,
}

impl Sweeper {
    pub fn new(
        ctx: AlertContext,
        processor: Arc<dyn AlertProcessor>,
        settings: SweeperSettings,
    ) -> Self {
        Self {
            ctx,
            processor,
            pool: WorkerPool::new(settings.pool_size),
            settings,
            last_report: Arc::new(RwLock::new(None)),
            shutdown_tx: None,
        }
    }

    pub fn status(&self) -> AlertStatus {
        self.processor.status()
    }

    pub fn report_handle(&self) -> ReportHandle {
        Arc::clone(&self.last_report)
    }

    /// Run a single sweep now and remember its report
    pub async fn run_once(&self) -> Result<SweepReport, SweepError> {
        Self::sweep(
            &self.ctx,
            &self.processor,
            &self.pool,
            self.settings,
            &self.last_report,
        )
        .await
    }

    /// Start the background loop
    pub fn start(&mut self) -> tokio::task::JoinHandle<()> {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        self.shutdown_tx = Some(shutdown_tx);

        let ctx = self.ctx.clone();
        let processor = Arc::clone(&self.processor);
        let pool = self.pool.clone();
        let last_report = Arc::clone(&self.last_report);
        let settings = self.settings;

        tokio::spawn(async move {
            let status = processor.status();
            tracing::info!(
                %status,
                interval = ?settings.interval,
                pool_size = settings.pool_size,
                "Sweeper started"
            );

            let mut ticker = interval(settings.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = Self::sweep(&ctx, &processor, &pool, settings, &last_report).await {
                            tracing::error!(%status, error = %e, "Sweep failed");
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        tracing::info!(%status, "Sweeper shutting down");
                        break;
                    }
                }
            }
        })
    }

    /// Stop the background loop after the current sweep
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(()).await;
        }
    }

    async fn sweep(
        ctx: &AlertContext,
        processor: &Arc<dyn AlertProcessor>,
        pool: &WorkerPool,
        settings: SweeperSettings,
        last_report: &ReportHandle,
    ) -> Result<SweepReport, SweepError> {
        let report = run_sweep(
            ctx,
            Arc::clone(processor),
            pool,
            settings.sweep_timeout,
        )
        .await?;
        *last_report.write() = Some(report.clone());
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::processors::today;
    use crate::alerts::{AlertRecord, QueuedProcessor};
    use crate::store::AlertStore;
    use crate::testing::{departing_on, harness, LookupBehavior};
    use chrono::Duration as ChronoDuration;
    use std::time::Duration;

    fn settings(interval_ms: u64) -> SweeperSettings {
        SweeperSettings::new(
            Duration::from_millis(interval_ms),
            2,
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_run_once_stores_report() {
        let h = harness();
        let record = AlertRecord::queued(1, "LH1", today() + ChronoDuration::days(20));
        h.store.upsert(&record).await.unwrap();

        let sweeper = Sweeper::new(h.ctx.clone(), Arc::new(QueuedProcessor), settings(1000));
        let handle = sweeper.report_handle();
        assert!(handle.read().is_none());

        let report = sweeper.run_once().await.unwrap();
        assert_eq!(report.frozen, 1);
        assert_eq!(handle.read().as_ref().map(|r| r.frozen), Some(1));
        assert_eq!(sweeper.status(), AlertStatus::Queued);
    }

    #[tokio::test]
    async fn test_retained_alert_converges_on_later_sweep() {
        let h = harness();
        let date = today() + ChronoDuration::days(2);
        let record = AlertRecord::queued(1, "LH2", date);
        h.store.upsert(&record).await.unwrap();
        h.lookup.set("LH2", LookupBehavior::Unreachable);

        let sweeper = Sweeper::new(h.ctx.clone(), Arc::new(QueuedProcessor), settings(1000));
        let first = sweeper.run_once().await.unwrap();
        assert_eq!(first.retained, 1);

        h.lookup.set("LH2", LookupBehavior::Flights(vec![departing_on("f", "LH2", date)]));
        let second = sweeper.run_once().await.unwrap();
        assert_eq!(second.activated, 1);
        assert_eq!(h.store.count(AlertStatus::Active).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_background_loop_sweeps_and_stops() {
        let h = harness();
        let date = today();
        h.lookup.set("LH3", LookupBehavior::Flights(vec![departing_on("f", "LH3", date)]));
        h.store.upsert(&AlertRecord::queued(1, "LH3", date)).await.unwrap();

        let mut sweeper = Sweeper::new(h.ctx.clone(), Arc::new(QueuedProcessor), settings(20));
        let handle = sweeper.start();

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(h.store.count(AlertStatus::Active).await.unwrap(), 1);
        assert!(sweeper.report_handle().read().is_some());

        sweeper.stop().await;
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
