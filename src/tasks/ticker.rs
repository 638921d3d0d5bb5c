//! Shared ticker driving the timer engine
//!
//! A single interval fires at a fixed nominal period for the whole process.
//! The elapsed time handed to the engine is measured from the previous
//! firing, not taken from the nominal period, so scheduling jitter and
//! throttling do not skew the timers.

use std::{sync::Mutex, time::Duration};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{interval, Instant, MissedTickBehavior},
};
use tracing::{debug, info, warn};

/// Source of the current time
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Instant;
}

/// Clock backed by the tokio runtime's time source
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        match self.now.lock() {
            Ok(now) => *now,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Reference point for measuring the time between two ticker firings
#[derive(Debug, Clone, Copy)]
pub struct TickBaseline {
    last_fire: Instant,
}

impl TickBaseline {
    pub fn new(now: Instant) -> Self {
        Self { last_fire: now }
    }

    /// Record a firing at `now` and return the time since the previous one
    pub fn fire(&mut self, now: Instant) -> Duration {
        let delta = now.saturating_duration_since(self.last_fire);
        self.last_fire = now;
        delta
    }

    /// Move the reference point to `now`, dropping any time accumulated so far.
    ///
    /// Must be called when a timer resumes so the paused interval is not
    /// counted as elapsed.
    pub fn rebaseline(&mut self, now: Instant) {
        self.last_fire = now;
    }
}

/// Periodic firing source, started once per process
#[derive(Debug, Clone, Copy)]
pub struct Ticker {
    period: Duration,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    /// Spawn the ticker task, calling `on_fire` once per period until stopped
    pub fn start<F>(self, mut on_fire: F) -> TickerHandle
    where
        F: FnMut() + Send + 'static,
    {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let period = self.period;

        let task = tokio::spawn(async move {
            info!("Starting ticker with a period of {}ms", period.as_millis());

            let mut interval = interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of an interval completes immediately
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = interval.tick() => on_fire(),
                    _ = stop_rx.changed() => {
                        debug!("Ticker received stop request");
                        break;
                    }
                }
            }

            info!("Ticker stopped");
        });

        TickerHandle { stop_tx, task }
    }
}

/// Handle to a running ticker
#[derive(Debug)]
pub struct TickerHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl TickerHandle {
    /// Stop firing and wait for the ticker task to finish
    pub async fn stop(self) {
        if self.stop_tx.send(true).is_err() {
            debug!("Ticker already finished");
        }
        if let Err(e) = self.task.await {
            warn!("Ticker task ended abnormally: {}", e);
        }
    }
}
