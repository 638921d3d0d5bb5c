//! State management module
//!
//! This module contains the timer entity, the store holding all timers, the
//! simulation engine advancing them and the shared application state.

pub mod app_state;
pub mod engine;
pub mod store;
pub mod timer;

// Re-export main types
pub use app_state::{AppState, StatusCounts};
pub use engine::{CompletionEvent, NewTimer, TickOutcome, TimerEngine};
pub use store::TimerStore;
pub use timer::{SoundType, Timer, TimerId, TimerStatus, DEFAULT_VOLUME};
