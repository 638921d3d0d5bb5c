//! Multitimer - concurrent countdown timers with alerts and persistence
//!
//! This library provides the timer simulation engine, the shared ticker that
//! drives it, and the adapters around it: alert delivery, blob persistence and
//! an HTTP command API.

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use error::CommandError;
pub use state::{AppState, NewTimer, Timer, TimerEngine, TimerId, TimerStore};
pub use utils::signals::shutdown_signal;
