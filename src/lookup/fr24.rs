//! FlightRadar24 flight list client

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value as Json;
use std::time::Duration;

use super::{FlightLookup, LookupError};
use crate::flight::FlightSnapshot;

const DEFAULT_BASE_URL: &str = "https://api.flightradar24.com/common/v1";
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:79.0) Gecko/20100101 Firefox/79.0";

/// Client configuration
#[derive(Debug, Clone)]
pub struct Fr24Config {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub timeout: Duration,
    /// Flights requested per page
    pub page_limit: u32,
}

impl Default for Fr24Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(5),
            timeout: Duration::from_secs(15),
            page_limit: 100,
        }
    }
}

/// Client for the public flight list endpoint
#[derive(Debug, Clone)]
pub struct Fr24Client {
    http_client: reqwest::Client,
    config: Fr24Config,
}

impl Fr24Client {
    pub fn new(config: Fr24Config) -> Result<Self, LookupError> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| LookupError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http_client, config })
    }

    /// All flights currently listed for `code`
    pub async fn list_flights(&self, code: &str) -> Result<Vec<FlightSnapshot>, LookupError> {
        let url = format!("{}/flight/list.json", self.config.base_url.trim_end_matches('/'));
        let limit = self.config.page_limit.to_string();

        tracing::debug!(flight_code = %code, "Requesting flight list");

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("fetchBy", "flight"),
                ("page", "1"),
                ("limit", limit.as_str()),
                ("query", code),
            ])
            .send()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LookupError::Transport(format!(
                "Flight list returned status {}",
                response.status()
            )));
        }

        let body: Json = response
            .json()
            .await
            .map_err(|e| LookupError::Decode(e.to_string()))?;

        parse_flight_list(code, &body)
    }
}

#[async_trait]
impl FlightLookup for Fr24Client {
    async fn find_by_date(
        &self,
        code: &str,
        date: NaiveDate,
    ) -> Result<Option<FlightSnapshot>, LookupError> {
        let flights = self.list_flights(code).await?;
        Ok(select_by_date(code, flights, date))
    }

    async fn find_by_id(
        &self,
        code: &str,
        flight_id: &str,
    ) -> Result<Option<FlightSnapshot>, LookupError> {
        let flights = self.list_flights(code).await?;
        let found = flights.into_iter().find(|f| f.flight_id == flight_id);
        if found.is_none() {
            tracing::warn!(flight_code = %code, flight_id = %flight_id, "Flight no longer listed");
        }
        Ok(found)
    }
}

/// The unique flight whose scheduled departure falls on `date` (UTC)
fn select_by_date(
    code: &str,
    flights: Vec<FlightSnapshot>,
    date: NaiveDate,
) -> Option<FlightSnapshot> {
    let mut matches: Vec<FlightSnapshot> = flights
        .into_iter()
        .filter(|f| {
            f.scheduled_departure
                .map(|dep| dep.date_naive() == date)
                .unwrap_or(false)
        })
        .collect();

    match matches.len() {
        1 => matches.pop(),
        0 => {
            tracing::info!(flight_code = %code, %date, "No flight scheduled on date");
            None
        }
        n => {
            tracing::warn!(flight_code = %code, %date, matches = n, "Ambiguous flight date");
            None
        }
    }
}

/// Decode the `result.response` envelope of a flight list
pub fn parse_flight_list(code: &str, body: &Json) -> Result<Vec<FlightSnapshot>, LookupError> {
    let response = body
        .pointer("/result/response")
        .filter(|r| r.is_object())
        .ok_or_else(|| LookupError::NoData(code.to_string()))?;

    let data = match response.get("data") {
        None | Some(Json::Null) => return Ok(Vec::new()),
        Some(Json::Array(items)) => items,
        Some(other) => {
            return Err(LookupError::Decode(format!(
                "Expected flight array, got {}",
                other
            )))
        }
    };

    Ok(data.iter().filter_map(parse_flight).collect())
}

/// Map one flight item; items without identity are skipped
fn parse_flight(item: &Json) -> Option<FlightSnapshot> {
    let flight_id = match item.pointer("/identification/row") {
        Some(Json::Number(n)) => n.to_string(),
        Some(Json::String(s)) => s.clone(),
        _ => item.pointer("/identification/id")?.as_str()?.to_string(),
    };
    let flight_code = item.pointer("/identification/number/default")?.as_str()?;

    let mut snapshot = FlightSnapshot::new(flight_id, flight_code);
    snapshot.status = text(item, "/status/text");
    snapshot.airline = text(item, "/airline/name");
    snapshot.scheduled_departure = timestamp(item, "/time/scheduled/departure");
    snapshot.scheduled_arrival = timestamp(item, "/time/scheduled/arrival");
    snapshot.real_departure = timestamp(item, "/time/real/departure");
    snapshot.real_arrival = timestamp(item, "/time/real/arrival");
    snapshot.estimated_departure = timestamp(item, "/time/estimated/departure");
    snapshot.estimated_arrival = timestamp(item, "/time/estimated/arrival");
    Some(snapshot)
}

fn text(item: &Json, pointer: &str) -> Option<String> {
    item.pointer(pointer)
        .and_then(Json::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn timestamp(item: &Json, pointer: &str) -> Option<DateTime<Utc>> {
    item.pointer(pointer)
        .and_then(Json::as_i64)
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
}
