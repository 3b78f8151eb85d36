//! Alert records as persisted in the store

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::flight::FlightSnapshot;

/// Lifecycle state of an alert. Removal is terminal and not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    Queued,
    Frozen,
    Active,
}

impl AlertStatus {
    pub const ALL: [AlertStatus; 3] = [AlertStatus::Queued, AlertStatus::Frozen, AlertStatus::Active];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Queued => "queued",
            AlertStatus::Frozen => "frozen",
            AlertStatus::Active => "active",
        }
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical store key: `{chat_id}_{flight_code}_{YYYY-MM-DD}`
pub fn alert_id(chat_id: i64, flight_code: &str, target_date: NaiveDate) -> String {
    format!("{}_{}_{}", chat_id, flight_code, target_date.format("%Y-%m-%d"))
}

/// One user's interest in one flight on one date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub id: String,
    pub chat_id: i64,
    pub flight_code: String,
    pub target_date: NaiveDate,
    pub status: AlertStatus,
    /// Last observed state of the flight; set once the alert is active
    #[serde(default)]
    pub snapshot: Option<FlightSnapshot>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AlertRecord {
    /// New queued alert
    pub fn queued(chat_id: i64, flight_code: impl Into<String>, target_date: NaiveDate) -> Self {
        let flight_code = flight_code.into();
        let now = Utc::now();
        Self {
            id: alert_id(chat_id, &flight_code, target_date),
            chat_id,
            flight_code,
            target_date,
            status: AlertStatus::Queued,
            snapshot: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Copy moved to frozen
    pub fn frozen(&self) -> Self {
        Self {
            status: AlertStatus::Frozen,
            updated_at: Utc::now(),
            ..self.clone()
        }
    }

    /// Copy moved to active (or kept active) with a fresh snapshot
    pub fn activated(&self, snapshot: FlightSnapshot) -> Self {
        Self {
            status: AlertStatus::Active,
            snapshot: Some(snapshot),
            updated_at: Utc::now(),
            ..self.clone()
        }
    }

    /// Days between today and the target date; negative once it has passed
    pub fn days_until(&self, today: NaiveDate) -> i64 {
        (self.target_date - today).num_days()
    }
}
