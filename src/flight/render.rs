//! Rendering of snapshot changes into chat messages

use chrono::{DateTime, Utc};

use super::diff::Diff;
use super::snapshot::{FlightSnapshot, SnapshotField};

/// Order in which a change is picked for the single per-sweep message
const PRIORITY: [SnapshotField; 4] = [
    SnapshotField::RealArrival,
    SnapshotField::RealDeparture,
    SnapshotField::EstimatedArrival,
    SnapshotField::EstimatedDeparture,
];

/// Humanized distance between a timestamp and now
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelativeTime {
    /// e.g. "1 day, 3 hours, 1 minute" or "just now"
    pub text: String,
    /// Timestamp lies after now
    pub is_future: bool,
}

impl RelativeTime {
    /// "<past> 5 minutes ago" or "<future> in 5 minutes". Under a minute reads
    /// as "<past> just now" or "<future> any minute now".
    pub fn phrase(&self, past: &str, future: &str) -> String {
        match (self.is_future, self.is_just_now()) {
            (true, true) => format!("{} any minute now", future),
            (true, false) => format!("{} in {}", future, self.text),
            (false, true) => format!("{} just now", past),
            (false, false) => format!("{} {} ago", past, self.text),
        }
    }

    fn is_just_now(&self) -> bool {
        self.text == "just now"
    }
}

/// Describe `ts` relative to `now` in days, hours and minutes
pub fn humanize(ts: DateTime<Utc>, now: DateTime<Utc>) -> RelativeTime {
    let delta = ts - now;
    let is_future = delta.num_seconds() > 0;
    let total = delta.num_seconds().unsigned_abs();

    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;

    let parts: Vec<String> = [(days, "day"), (hours, "hour"), (minutes, "minute")]
        .into_iter()
        .filter(|(n, _)| *n != 0)
        .map(|(n, unit)| {
            if n == 1 {
                format!("{} {}", n, unit)
            } else {
                format!("{} {}s", n, unit)
            }
        })
        .collect();

    let text = if parts.is_empty() {
        "just now".to_string()
    } else {
        parts.join(", ")
    };

    RelativeTime { text, is_future }
}

/// Pick and render at most one message for a change set.
///
/// `new` is the fresh snapshot the diff was computed against.
pub fn render_update(new: &FlightSnapshot, diff: &Diff, now: DateTime<Utc>) -> Option<String> {
    let code = &new.flight_code;

    for field in PRIORITY {
        if !diff.contains(field) {
            continue;
        }
        let Some(ts) = new.field(field).as_timestamp() else {
            continue;
        };
        let when = humanize(ts, now);

        let message = match field {
            SnapshotField::RealArrival => {
                format!("Your flight {} {}.", code, when.phrase("has arrived", "will arrive"))
            }
            SnapshotField::RealDeparture => {
                let mut reply =
                    format!("Your flight {} {}.", code, when.phrase("has departed", "will depart"));
                if let Some(eta) = new.estimated_arrival {
                    let eta = humanize(eta, now);
                    reply.push_str(&format!(
                        " It {}.",
                        eta.phrase("should have arrived", "will arrive")
                    ));
                }
                reply
            }
            SnapshotField::EstimatedArrival => format!(
                "Your flight {} {}.",
                code,
                when.phrase("should have arrived", "will arrive")
            ),
            _ => format!(
                "Your flight {} {}.",
                code,
                when.phrase("should have departed", "will depart")
            ),
        };
        return Some(message);
    }

    if diff.contains(SnapshotField::Status) {
        if let Some(status) = &new.status {
            return Some(format!("Status of your flight {} changed: {}", code, status));
        }
    }

    None
}

/// Final message for a flight that has landed
pub fn render_arrival(snapshot: &FlightSnapshot, now: DateTime<Utc>) -> String {
    let headline = match snapshot.real_arrival {
        Some(ts) => format!(
            "Your flight {} {}.",
            snapshot.flight_code,
            humanize(ts, now).phrase("has arrived", "will arrive")
        ),
        None => format!("Your flight {} has arrived.", snapshot.flight_code),
    };
    format!("{}\n{}", headline, snapshot)
}
