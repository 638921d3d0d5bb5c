//! Background tasks module
//!
//! This module contains the ticker and the tasks consuming engine output
//! alongside the HTTP server.

pub mod alert_dispatch;
pub mod persistence;
pub mod ticker;

// Re-export main functions
pub use alert_dispatch::alert_dispatch_task;
pub use persistence::{
    load_store, persistence_task, save_snapshot, spawn_persistence, PersistenceHandle,
};
pub use ticker::{Clock, ManualClock, SystemClock, TickBaseline, Ticker, TickerHandle};
