//! Flight snapshot model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Current snapshot layout. Bump when the field set changes.
pub const SCHEMA_VERSION: u32 = 1;

/// Named fields of a snapshot, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotField {
    Status,
    Airline,
    ScheduledDeparture,
    RealDeparture,
    EstimatedDeparture,
    ScheduledArrival,
    RealArrival,
    EstimatedArrival,
}

impl SnapshotField {
    pub const ALL: [SnapshotField; 8] = [
        SnapshotField::Status,
        SnapshotField::Airline,
        SnapshotField::ScheduledDeparture,
        SnapshotField::RealDeparture,
        SnapshotField::EstimatedDeparture,
        SnapshotField::ScheduledArrival,
        SnapshotField::RealArrival,
        SnapshotField::EstimatedArrival,
    ];

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            SnapshotField::Status => "Current Status",
            SnapshotField::Airline => "Airline",
            SnapshotField::ScheduledDeparture => "Scheduled Departure",
            SnapshotField::RealDeparture => "Real Departure",
            SnapshotField::EstimatedDeparture => "Estimated Departure",
            SnapshotField::ScheduledArrival => "Scheduled Arrival",
            SnapshotField::RealArrival => "Real Arrival",
            SnapshotField::EstimatedArrival => "Estimated Arrival",
        }
    }

    /// Whether the field carries a timestamp (and is compared with tolerance)
    pub fn is_timestamp(&self) -> bool {
        !matches!(self, SnapshotField::Status | SnapshotField::Airline)
    }
}

impl fmt::Display for SnapshotField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Value of a single snapshot field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Timestamp(Option<DateTime<Utc>>),
    Text(Option<String>),
}

impl FieldValue {
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Timestamp(ts) => *ts,
            FieldValue::Text(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Timestamp(Some(ts)) => write!(f, "{}", ts.format("%d/%m/%Y %H:%M UTC")),
            FieldValue::Text(Some(text)) => f.write_str(text),
            FieldValue::Timestamp(None) | FieldValue::Text(None) => f.write_str("-"),
        }
    }
}

/// Point-in-time capture of a flight's schedule and status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightSnapshot {
    /// Opaque identity assigned by the lookup service
    pub flight_id: String,
    /// Airline code plus flight number, e.g. "LH1234"
    pub flight_code: String,
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    /// Status text as reported; `None` when the service does not know it
    pub status: Option<String>,
    pub airline: Option<String>,
    pub scheduled_departure: Option<DateTime<Utc>>,
    pub real_departure: Option<DateTime<Utc>>,
    pub estimated_departure: Option<DateTime<Utc>>,
    pub scheduled_arrival: Option<DateTime<Utc>>,
    pub real_arrival: Option<DateTime<Utc>>,
    pub estimated_arrival: Option<DateTime<Utc>>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl FlightSnapshot {
    /// Create a snapshot with every field empty
    pub fn new(flight_id: impl Into<String>, flight_code: impl Into<String>) -> Self {
        Self {
            flight_id: flight_id.into(),
            flight_code: flight_code.into(),
            schema_version: SCHEMA_VERSION,
            status: None,
            airline: None,
            scheduled_departure: None,
            real_departure: None,
            estimated_departure: None,
            scheduled_arrival: None,
            real_arrival: None,
            estimated_arrival: None,
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_airline(mut self, airline: impl Into<String>) -> Self {
        self.airline = Some(airline.into());
        self
    }

    /// Set a timestamp field. Non-timestamp fields are left untouched.
    pub fn with_time(mut self, field: SnapshotField, ts: DateTime<Utc>) -> Self {
        if let Some(slot) = self.timestamp_mut(field) {
            *slot = Some(ts);
        }
        self
    }

    /// Read a field by name
    pub fn field(&self, field: SnapshotField) -> FieldValue {
        match field {
            SnapshotField::Status => FieldValue::Text(self.status.clone()),
            SnapshotField::Airline => FieldValue::Text(self.airline.clone()),
            SnapshotField::ScheduledDeparture => FieldValue::Timestamp(self.scheduled_departure),
            SnapshotField::RealDeparture => FieldValue::Timestamp(self.real_departure),
            SnapshotField::EstimatedDeparture => FieldValue::Timestamp(self.estimated_departure),
            SnapshotField::ScheduledArrival => FieldValue::Timestamp(self.scheduled_arrival),
            SnapshotField::RealArrival => FieldValue::Timestamp(self.real_arrival),
            SnapshotField::EstimatedArrival => FieldValue::Timestamp(self.estimated_arrival),
        }
    }

    fn timestamp_mut(&mut self, field: SnapshotField) -> Option<&mut Option<DateTime<Utc>>> {
        match field {
            SnapshotField::ScheduledDeparture => Some(&mut self.scheduled_departure),
            SnapshotField::RealDeparture => Some(&mut self.real_departure),
            SnapshotField::EstimatedDeparture => Some(&mut self.estimated_departure),
            SnapshotField::ScheduledArrival => Some(&mut self.scheduled_arrival),
            SnapshotField::RealArrival => Some(&mut self.real_arrival),
            SnapshotField::EstimatedArrival => Some(&mut self.estimated_arrival),
            SnapshotField::Status | SnapshotField::Airline => None,
        }
    }

    pub fn has_arrived(&self) -> bool {
        self.real_arrival.is_some()
    }

    /// Status missing or reported as "unknown"
    pub fn is_status_unknown(&self) -> bool {
        match &self.status {
            None => true,
            Some(status) => status.trim().is_empty() || status.trim().eq_ignore_ascii_case("unknown"),
        }
    }
}

impl fmt::Display for FlightSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Flight: {}", self.flight_code)?;
        for field in SnapshotField::ALL {
            write!(f, "\n{}: {}", field.label(), self.field(field))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_with_time_sets_only_timestamps() {
        let ts = Utc.with_ymd_and_hms(2026, 10, 14, 12, 0, 0).unwrap();
        let snap = FlightSnapshot::new("2a3b", "LH1234")
            .with_time(SnapshotField::EstimatedArrival, ts)
            .with_time(SnapshotField::Status, ts);

        assert_eq!(snap.estimated_arrival, Some(ts));
        assert_eq!(snap.status, None);
        assert_eq!(snap.field(SnapshotField::EstimatedArrival).as_timestamp(), Some(ts));
    }

    #[test]
    fn test_unknown_status() {
        let snap = FlightSnapshot::new("1", "LH1");
        assert!(snap.is_status_unknown());
        assert!(snap.clone().with_status("Unknown").is_status_unknown());
        assert!(!snap.with_status("Scheduled").is_status_unknown());
    }

    #[test]
    fn test_display_lists_every_field() {
        let snap = FlightSnapshot::new("1", "BA276").with_status("Estimated 14:05");
        let text = snap.to_string();

        assert!(text.starts_with("Flight: BA276"));
        for field in SnapshotField::ALL {
            assert!(text.contains(field.label()), "missing {}", field);
        }
    }

    #[test]
    fn test_serde_defaults_schema_version() {
        let json = serde_json::json!({
            "flight_id": "1",
            "flight_code": "BA276",
            "status": null,
            "airline": null,
            "scheduled_departure": null,
            "real_departure": null,
            "estimated_departure": null,
            "scheduled_arrival": null,
            "real_arrival": null,
            "estimated_arrival": null
        });
        let snap: FlightSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(snap.schema_version, SCHEMA_VERSION);
    }
}
