use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{Duration, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use crate::alerts::{AlertRecord, AlertStatus};
use crate::store::{AlertStore, StoreError};
use crate::sweep::{ReportHandle, SweepReport};

/// Registrations for dates further in the past than this are rejected
const MAX_PAST_DAYS: i64 = 2;

/// Application state shared across handlers
pub struct AppState {
    pub store: Arc<dyn AlertStore>,
    /// Latest report of each running sweeper
    pub reports: Vec<ReportHandle>,
}

// ============================================================================
// Health Check
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============================================================================
// Alerts
// ============================================================================

#[derive(Deserialize)]
pub struct CreateAlertRequest {
    pub chat_id: i64,
    pub flight_code: String,
    pub date: NaiveDate,
}

#[derive(Serialize)]
pub struct CreateAlertResponse {
    pub id: String,
    pub status: AlertStatus,
}

fn flight_code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([A-Z0-9]{2}|[A-Z]{3})[0-9]{1,4}$").expect("flight code pattern is valid")
    })
}

/// Uppercase and strip whitespace; `None` if the result is not a flight code
pub fn normalize_flight_code(raw: &str) -> Option<String> {
    let code: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();
    flight_code_pattern().is_match(&code).then_some(code)
}

pub async fn create_alert(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateAlertRequest>,
) -> Result<(StatusCode, Json<CreateAlertResponse>), ApiError> {
    let code = normalize_flight_code(&request.flight_code).ok_or_else(|| {
        ApiError::BadRequest(format!("'{}' is not a valid flight code", request.flight_code))
    })?;

    let earliest = Utc::now().date_naive() - Duration::days(MAX_PAST_DAYS);
    if request.date < earliest {
        return Err(ApiError::BadRequest(format!(
            "Date {} is too far in the past",
            request.date
        )));
    }

    let record = AlertRecord::queued(request.chat_id, code, request.date);
    state.store.upsert(&record).await?;
    tracing::info!(alert_id = %record.id, chat_id = record.chat_id, "Alert registered");

    Ok((
        StatusCode::CREATED,
        Json(CreateAlertResponse {
            id: record.id,
            status: record.status,
        }),
    ))
}

pub async fn get_alert(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<AlertRecord>, ApiError> {
    state
        .store
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Alert '{}' not found", id)))
}

#[derive(Serialize)]
pub struct DeleteAlertResponse {
    pub deleted: String,
}

pub async fn delete_alert(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteAlertResponse>, ApiError> {
    if !state.store.delete(&id).await? {
        return Err(ApiError::NotFound(format!("Alert '{}' not found", id)));
    }
    tracing::info!(alert_id = %id, "Alert cancelled");
    Ok(Json(DeleteAlertResponse { deleted: id }))
}

// ============================================================================
// Stats
// ============================================================================

#[derive(Serialize)]
pub struct StatsResponse {
    pub alerts: BTreeMap<&'static str, usize>,
    pub total: usize,
    pub last_sweeps: Vec<SweepReport>,
}

pub async fn stats(State(state): State<Arc<AppState>>) -> Result<Json<StatsResponse>, ApiError> {
    let mut alerts = BTreeMap::new();
    for status in AlertStatus::ALL {
        alerts.insert(status.as_str(), state.store.count(status).await?);
    }
    let total = alerts.values().sum();

    let last_sweeps = state
        .reports
        .iter()
        .filter_map(|handle| handle.read().clone())
        .collect();

    Ok(Json(StatsResponse {
        alerts,
        total,
        last_sweeps,
    }))
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        tracing::error!(error = %e, "Store operation failed");
        ApiError::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}
