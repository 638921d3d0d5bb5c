//! Main application state shared by the ticker, the alert and persistence
//! tasks, and the HTTP handlers

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use super::{
    CompletionEvent, NewTimer, TickOutcome, Timer, TimerEngine, TimerId, TimerStatus, TimerStore,
};
use crate::{
    error::CommandError,
    tasks::ticker::{Clock, TickBaseline},
};

/// Engine plus the tick reference point. Both live behind one lock so ticks
/// and commands are never interleaved.
#[derive(Debug)]
struct TimerRuntime {
    engine: TimerEngine,
    baseline: TickBaseline,
}

/// Number of timers in each lifecycle state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub idle: usize,
    pub running: usize,
    pub paused: usize,
    pub completed: usize,
}

/// Main application state owning the timer engine
pub struct AppState {
    runtime: Mutex<TimerRuntime>,
    clock: Arc<dyn Clock>,
    /// Nominal ticker period
    pub tick_period: Duration,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Completion events for the alert dispatcher
    completion_tx: mpsc::UnboundedSender<CompletionEvent>,
    /// Store snapshot published after every mutation
    store_tx: watch::Sender<TimerStore>,
    /// Keep the receiver alive to prevent channel closure
    _store_rx: watch::Receiver<TimerStore>,
}

impl AppState {
    pub fn new(
        port: u16,
        host: String,
        tick_period: Duration,
        store: TimerStore,
        clock: Arc<dyn Clock>,
        completion_tx: mpsc::UnboundedSender<CompletionEvent>,
    ) -> Self {
        let (store_tx, store_rx) = watch::channel(store.clone());
        let runtime = TimerRuntime {
            engine: TimerEngine::new(store),
            baseline: TickBaseline::new(clock.now()),
        };

        Self {
            runtime: Mutex::new(runtime),
            clock,
            tick_period,
            start_time: Instant::now(),
            port,
            host,
            completion_tx,
            store_tx,
            _store_rx: store_rx,
        }
    }

    fn lock(&self) -> MutexGuard<'_, TimerRuntime> {
        // Every mutation leaves the store consistent, so a poisoned lock is still usable
        self.runtime.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, store: &TimerStore) {
        self.store_tx.send_replace(store.clone());
    }

    /// Subscribe to store snapshots, one per mutation
    pub fn subscribe_store(&self) -> watch::Receiver<TimerStore> {
        self.store_tx.subscribe()
    }

    /// Handle one ticker firing: measure the elapsed time, advance every
    /// running timer by it and forward completions to the alert dispatcher.
    pub fn tick(&self) -> TickOutcome {
        let mut runtime = self.lock();
        let delta = runtime.baseline.fire(self.clock.now());
        let outcome = runtime.engine.tick(delta.as_secs_f64());

        if outcome.changed {
            self.publish(runtime.engine.store());
        }
        drop(runtime);

        for event in &outcome.completions {
            if let Err(e) = self.completion_tx.send(event.clone()) {
                warn!("Failed to forward completion of timer {}: {}", event.timer_id, e);
            }
        }

        outcome
    }

    pub fn create(&self, new: NewTimer) -> Result<Timer, CommandError> {
        let mut runtime = self.lock();
        let timer = runtime.engine.create(new)?.clone();
        self.publish(runtime.engine.store());
        Ok(timer)
    }

    /// Start or pause a timer. Starting re-baselines the tick reference so
    /// the time spent paused is not counted.
    pub fn toggle(&self, id: TimerId) -> Result<Timer, CommandError> {
        let mut runtime = self.lock();
        let status = runtime.engine.toggle(id)?;
        if status == TimerStatus::Running {
            let now = self.clock.now();
            runtime.baseline.rebaseline(now);
        }
        self.publish(runtime.engine.store());
        runtime.engine.get(id).cloned()
    }

    pub fn reset(&self, id: TimerId) -> Result<Timer, CommandError> {
        let mut runtime = self.lock();
        let timer = runtime.engine.reset(id)?.clone();
        self.publish(runtime.engine.store());
        Ok(timer)
    }

    pub fn delete(&self, id: TimerId) -> Result<Timer, CommandError> {
        let mut runtime = self.lock();
        let timer = runtime.engine.delete(id)?;
        self.publish(runtime.engine.store());
        Ok(timer)
    }

    pub fn set_volume(&self, id: TimerId, volume: f64) -> Result<Timer, CommandError> {
        let mut runtime = self.lock();
        let timer = runtime.engine.set_volume(id, volume)?.clone();
        debug!("Volume of timer {} set to {}", id, timer.volume);
        self.publish(runtime.engine.store());
        Ok(timer)
    }

    pub fn get(&self, id: TimerId) -> Result<Timer, CommandError> {
        self.lock().engine.get(id).cloned()
    }

    /// All timers in display order
    pub fn list(&self) -> Vec<Timer> {
        self.lock().engine.store().sorted()
    }

    /// Copy of the current store
    pub fn snapshot(&self) -> TimerStore {
        self.lock().engine.store().clone()
    }

    pub fn status_counts(&self) -> StatusCounts {
        let runtime = self.lock();
        let mut counts = StatusCounts::default();
        for timer in runtime.engine.store().list() {
            match timer.status() {
                TimerStatus::Idle => counts.idle += 1,
                TimerStatus::Running => counts.running += 1,
                TimerStatus::Paused => counts.paused += 1,
                TimerStatus::Completed => counts.completed += 1,
            }
        }
        counts
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}
