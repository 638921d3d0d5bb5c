//! Error types for commands, storage and alert delivery

use thiserror::Error;

use crate::state::TimerId;

/// Rejection of a user command at the command boundary.
///
/// A rejected command leaves the store untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("duration must be a positive number of seconds, got {0}")]
    InvalidDuration(f64),

    #[error("volume must be within [0, 1], got {0}")]
    InvalidVolume(f64),

    #[error("timer {0} not found")]
    NotFound(TimerId),
}

/// Failure of the durable blob storage backend
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize timers: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Failure to deliver an alert. Always swallowed by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlertError {
    #[error("alert backend unavailable")]
    Unavailable,

    #[error("notification permission not granted")]
    PermissionDenied,

    #[error("alert backend failed: {0}")]
    Backend(String),
}
