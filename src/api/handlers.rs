//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use tracing::info;

use super::responses::{ApiError, HealthResponse, StatusResponse, TimerView};
use crate::{
    error::CommandError,
    state::{AppState, NewTimer, TimerId},
};

/// Body of PUT /timers/:id/volume
#[derive(Debug, Deserialize)]
pub struct VolumeRequest {
    pub volume: f64,
}

fn parse_id(raw: &str) -> Result<TimerId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request(format!("invalid timer id: {}", raw)))
}

/// Handle GET /timers - List timers in display order
pub async fn list_timers_handler(State(state): State<Arc<AppState>>) -> Json<Vec<TimerView>> {
    Json(state.list().into_iter().map(TimerView::from).collect())
}

/// Handle POST /timers - Create an idle timer
pub async fn create_timer_handler(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewTimer>,
) -> Result<(StatusCode, Json<TimerView>), ApiError> {
    let timer = state.create(new)?;
    info!("Create endpoint called - timer {} created", timer.id);
    Ok((StatusCode::CREATED, Json(timer.into())))
}

/// Handle GET /timers/:id - Fetch one timer
pub async fn get_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TimerView>, ApiError> {
    let timer = state.get(parse_id(&id)?)?;
    Ok(Json(timer.into()))
}

/// Handle POST /timers/:id/toggle - Start or pause a timer
pub async fn toggle_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TimerView>, ApiError> {
    let timer = state.toggle(parse_id(&id)?)?;
    info!("Toggle endpoint called - timer {} is now {:?}", timer.id, timer.status());
    Ok(Json(timer.into()))
}

/// Handle POST /timers/:id/reset - Restore the full duration
pub async fn reset_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TimerView>, ApiError> {
    let timer = state.reset(parse_id(&id)?)?;
    info!("Reset endpoint called - timer {} reset", timer.id);
    Ok(Json(timer.into()))
}

/// Handle DELETE /timers/:id - Remove a timer
pub async fn delete_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.delete(parse_id(&id)?)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handle PUT /timers/:id/volume - Change the alert volume
pub async fn volume_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<VolumeRequest>,
) -> Result<Json<TimerView>, ApiError> {
    let id = parse_id(&id)?;
    if !(0.0..=1.0).contains(&request.volume) {
        return Err(CommandError::InvalidVolume(request.volume).into());
    }
    let timer = state.set_volume(id, request.volume)?;
    Ok(Json(timer.into()))
}

/// Handle GET /status - Return timer counts and server info
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let counts = state.status_counts();
    Json(StatusResponse {
        timers: counts.idle + counts.running + counts.paused + counts.completed,
        counts,
        tick_ms: state.tick_period.as_millis() as u64,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
