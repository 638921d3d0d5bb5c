//! API response structures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::CommandError,
    state::{StatusCounts, Timer, TimerStatus},
    utils::format_time,
};

/// Timer as shown to clients, with derived presentation fields
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerView {
    #[serde(flatten)]
    pub timer: Timer,
    pub status: TimerStatus,
    /// Remaining time formatted as `MM:SS` or `H:MM:SS`
    pub display: String,
    /// Fraction of the duration remaining, within `[0, 1]`
    pub progress: f64,
    /// Whether resetting would change anything
    pub can_reset: bool,
}

impl From<Timer> for TimerView {
    fn from(timer: Timer) -> Self {
        Self {
            status: timer.status(),
            display: format_time(timer.remaining_time),
            progress: timer.progress(),
            can_reset: !timer.is_at_full_duration() || timer.is_running,
            timer,
        }
    }
}

/// Status response with timer counts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub timers: usize,
    pub counts: StatusCounts,
    pub tick_ms: u64,
    pub uptime: String,
    pub port: u16,
    pub host: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Error body returned by failing endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Rejected request, rendered as an [`ErrorResponse`]
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<CommandError> for ApiError {
    fn from(err: CommandError) -> Self {
        let status = match err {
            CommandError::InvalidDuration(_) | CommandError::InvalidVolume(_) => {
                StatusCode::BAD_REQUEST
            }
            CommandError::NotFound(_) => StatusCode::NOT_FOUND,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        debug!("Rejecting request ({}): {}", self.status, self.message);
        let body = ErrorResponse {
            status: "error".to_string(),
            message: self.message,
            timestamp: Utc::now(),
        };
        (self.status, Json(body)).into_response()
    }
}
