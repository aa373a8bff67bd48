//! REST API endpoints for the cometblue-service.
//!
//! Thermostats are addressed by display name or Bluetooth address; both
//! match case-insensitively.
//!
//! # Locking
//!
//! Each handler holds the thermostat's mutex from validation until the
//! snapshot it returns is taken, so the range and mode checks see the same
//! entity the write goes to.
//!
//! # Errors
//!
//! All endpoints return structured JSON errors via [`AppError`]. Driver
//! failures return HTTP 502; the device, not the service, is the problem.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::info;

use cometblue_core::{ClimateEntity, ClimateState, HvacMode};

use crate::state::{AppState, ThermostatHandle, UpdateStats};

/// Create the API router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/status", get(get_status))
        .route("/api/thermostats", get(list_thermostats))
        .route("/api/thermostats/{id}", get(get_thermostat))
        .route("/api/thermostats/{id}/temperature", post(set_temperature))
        .route("/api/thermostats/{id}/hvac_mode", post(set_hvac_mode))
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Health check endpoint.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: OffsetDateTime::now_utc(),
    })
}

/// Service status response.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub version: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub collector: CollectorStatus,
    pub thermostats: Vec<UpdateStats>,
}

/// Collector status.
#[derive(Debug, Serialize)]
pub struct CollectorStatus {
    pub running: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub started_at: Option<OffsetDateTime>,
    pub uptime_seconds: Option<u64>,
    pub scan_interval: u64,
}

/// Collector status and per-thermostat update stats.
async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let started_at = state.collector.started_at();
    let uptime_seconds = started_at.map(|s| {
        let now = OffsetDateTime::now_utc();
        (now - s).whole_seconds().max(0) as u64
    });
    let scan_interval = state.config.read().await.host.scan_interval;
    let thermostats = state.collector.stats.read().await.clone();

    Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION"),
        timestamp: OffsetDateTime::now_utc(),
        collector: CollectorStatus {
            running: state.collector.is_running(),
            started_at,
            uptime_seconds,
            scan_interval,
        },
        thermostats,
    })
}

/// Snapshot every thermostat.
async fn list_thermostats(State(state): State<Arc<AppState>>) -> Json<Vec<ClimateState>> {
    let mut snapshots = Vec::with_capacity(state.thermostats.len());
    for handle in &state.thermostats {
        snapshots.push(handle.entity.lock().await.state());
    }
    Json(snapshots)
}

/// Snapshot one thermostat.
async fn get_thermostat(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ClimateState>, AppError> {
    let handle = lookup(&state, &id)?;
    let entity = handle.entity.lock().await;
    Ok(Json(entity.state()))
}

/// Request body for setting the target temperature.
#[derive(Debug, Deserialize)]
pub struct SetTemperatureRequest {
    pub temperature: f32,
}

/// Set the target temperature.
async fn set_temperature(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<SetTemperatureRequest>,
) -> Result<Json<ClimateState>, AppError> {
    let handle = lookup(&state, &id)?;
    let mut entity = handle.entity.lock().await;

    let (min, max) = (entity.min_temp(), entity.max_temp());
    if !(min..=max).contains(&request.temperature) {
        return Err(AppError::BadRequest(format!(
            "Temperature {} is outside {}..={}",
            request.temperature, min, max
        )));
    }

    entity.set_temperature(request.temperature).await?;
    info!("{} target set to {}", handle.name, request.temperature);
    Ok(Json(entity.state()))
}

/// Request body for setting the HVAC mode.
///
/// The mode is taken as a string so unknown names get the same 400 as
/// modes the thermostat does not offer.
#[derive(Debug, Deserialize)]
pub struct SetHvacModeRequest {
    pub hvac_mode: String,
}

/// Set the HVAC mode.
async fn set_hvac_mode(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<SetHvacModeRequest>,
) -> Result<Json<ClimateState>, AppError> {
    let handle = lookup(&state, &id)?;
    let mode: HvacMode = request
        .hvac_mode
        .parse()
        .map_err(|e: cometblue_types::ParseError| AppError::BadRequest(e.to_string()))?;

    let mut entity = handle.entity.lock().await;
    entity.set_hvac_mode(mode).await?;
    info!("{} mode set to {}", handle.name, mode);
    Ok(Json(entity.state()))
}

fn lookup<'a>(state: &'a AppState, id: &str) -> Result<&'a ThermostatHandle, AppError> {
    state
        .find(id)
        .ok_or_else(|| AppError::NotFound(format!("Thermostat not found: {}", id)))
}

/// API error type.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Device(cometblue_core::Error),
}

impl From<cometblue_core::Error> for AppError {
    fn from(e: cometblue_core::Error) -> Self {
        if matches!(e, cometblue_core::Error::UnsupportedMode { .. }) {
            AppError::BadRequest(e.to_string())
        } else {
            AppError::Device(e)
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Device(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
        };

        let body = serde_json::json!({
            "error": message,
        });

        (status, Json(body)).into_response()
    }
}
