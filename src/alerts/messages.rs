//! User-facing chat messages

use chrono::NaiveDate;

use crate::flight::FlightSnapshot;

fn day(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

pub fn too_far(code: &str, date: NaiveDate) -> String {
    format!(
        "Flight {} on {} is too far from today. I will keep my eye on it ;)",
        code,
        day(date)
    )
}

pub fn lookup_failed(code: &str, date: NaiveDate) -> String {
    format!(
        "I could not get any information about flight {} on {} yet. I will try again soon.",
        code,
        day(date)
    )
}

pub fn not_found(code: &str, date: NaiveDate) -> String {
    format!("Sorry, I did not find flight {} on {}.", code, day(date))
}

pub fn already_arrived(snapshot: &FlightSnapshot) -> String {
    format!("- - Your flight has already arrived - -\n{}", snapshot)
}

pub fn status_unknown(code: &str) -> String {
    format!(
        "Hmm, looks like I don't have info about your {} flight. I stopped watching it.",
        code
    )
}

pub fn now_tracking(snapshot: &FlightSnapshot) -> String {
    format!("I found your flight and will keep you posted.\n{}", snapshot)
}

pub fn lost_track(code: &str) -> String {
    format!(
        "I lost track of your flight {}, so I stopped watching it.",
        code
    )
}
