//! Test doubles for the external collaborators

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDate, NaiveTime};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::AlertPolicy;
use crate::context::AlertContext;
use crate::flight::{FlightSnapshot, SnapshotField};
use crate::lookup::{FlightLookup, LookupError};
use crate::notify::{Notifier, NotifyError};
use crate::store::MemoryStore;

/// Scheduled flight departing at 10:00 UTC on `date`
pub fn departing_on(flight_id: &str, code: &str, date: NaiveDate) -> FlightSnapshot {
    let dep = date
        .and_time(NaiveTime::from_hms_opt(10, 0, 0).unwrap())
        .and_utc();
    FlightSnapshot::new(flight_id, code)
        .with_status("Scheduled")
        .with_time(SnapshotField::ScheduledDeparture, dep)
        .with_time(SnapshotField::ScheduledArrival, dep + ChronoDuration::hours(2))
}

/// How the fake lookup answers for one flight code
#[derive(Debug, Clone)]
pub enum LookupBehavior {
    Flights(Vec<FlightSnapshot>),
    NoData,
    Unreachable,
    Panic,
}

/// Scripted lookup service. Codes without a behavior report no data.
#[derive(Default)]
pub struct FakeLookup {
    behaviors: Mutex<HashMap<String, LookupBehavior>>,
    delays: Mutex<HashMap<String, Duration>>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeLookup {
    pub fn set(&self, code: &str, behavior: LookupBehavior) {
        self.behaviors.lock().insert(code.to_string(), behavior);
    }

    pub fn set_delay(&self, code: &str, delay: Duration) {
        self.delays.lock().insert(code.to_string(), delay);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of lookups seen running at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn flights(&self, code: &str) -> Result<Vec<FlightSnapshot>, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        let delay = self.delays.lock().get(code).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        let behavior = self.behaviors.lock().get(code).cloned();
        match behavior {
            Some(LookupBehavior::Flights(flights)) => Ok(flights),
            Some(LookupBehavior::Unreachable) => {
                Err(LookupError::Transport("connection refused".to_string()))
            }
            Some(LookupBehavior::Panic) => panic!("lookup exploded for {}", code),
            Some(LookupBehavior::NoData) | None => Err(LookupError::NoData(code.to_string())),
        }
    }
}

#[async_trait]
impl FlightLookup for FakeLookup {
    async fn find_by_date(
        &self,
        code: &str,
        date: NaiveDate,
    ) -> Result<Option<FlightSnapshot>, LookupError> {
        let mut matches: Vec<FlightSnapshot> = self
            .flights(code)
            .await?
            .into_iter()
            .filter(|f| f.scheduled_departure.map(|d| d.date_naive()) == Some(date))
            .collect();
        if matches.len() == 1 {
            Ok(matches.pop())
        } else {
            Ok(None)
        }
    }

    async fn find_by_id(
        &self,
        code: &str,
        flight_id: &str,
    ) -> Result<Option<FlightSnapshot>, LookupError> {
        Ok(self
            .flights(code)
            .await?
            .into_iter()
            .find(|f| f.flight_id == flight_id))
    }
}

/// Notifier remembering every message
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(i64, String)>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<(i64, String)> {
        self.sent.lock().clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, chat_id: i64, text: &str) -> Result<(), NotifyError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::Http("chat service down".to_string()));
        }
        self.sent.lock().push((chat_id, text.to_string()));
        Ok(())
    }
}

pub struct Harness {
    pub ctx: AlertContext,
    pub store: Arc<MemoryStore>,
    pub lookup: Arc<FakeLookup>,
    pub notifier: Arc<RecordingNotifier>,
}

/// Context wired to an in-memory store and the fakes above
pub fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let lookup = Arc::new(FakeLookup::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let ctx = AlertContext::new(
        store.clone(),
        lookup.clone(),
        notifier.clone(),
        AlertPolicy::default(),
    );
    Harness {
        ctx,
        store,
        lookup,
        notifier,
    }
}
