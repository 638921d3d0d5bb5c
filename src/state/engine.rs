//! Timer simulation engine
//!
//! Advances every running timer against one shared delta per tick and turns
//! completions into [`CompletionEvent`] values. The engine performs no I/O:
//! playing sounds and showing notifications is left to whoever consumes the
//! events.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{
    store::TimerStore,
    timer::{SoundType, Timer, TimerId, TimerStatus, DEFAULT_VOLUME},
};
use crate::error::CommandError;

/// Request to alert the user that a timer ran out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionEvent {
    pub timer_id: TimerId,
    pub sound: SoundType,
    pub volume: f64,
    pub label: String,
    pub notify: bool,
}

impl CompletionEvent {
    fn for_timer(timer: &Timer) -> Self {
        Self {
            timer_id: timer.id,
            sound: timer.sound,
            volume: timer.volume,
            label: timer.display_label().to_string(),
            notify: timer.use_notification,
        }
    }
}

/// Parameters of the `create` command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTimer {
    /// Duration in seconds
    pub duration: f64,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub sound: SoundType,
    #[serde(default)]
    pub use_notification: bool,
    #[serde(default)]
    pub is_looping: bool,
    #[serde(default)]
    pub volume: Option<f64>,
}

impl NewTimer {
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            label: String::new(),
            sound: SoundType::default(),
            use_notification: false,
            is_looping: false,
            volume: None,
        }
    }
}

/// Result of advancing the engine by one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    /// One event per completion, in store order
    pub completions: Vec<CompletionEvent>,
    /// Whether any timer was mutated
    pub changed: bool,
}

/// State machine driving all timers in a [`TimerStore`]
#[derive(Debug, Clone, Default)]
pub struct TimerEngine {
    store: TimerStore,
}

impl TimerEngine {
    pub fn new(store: TimerStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &TimerStore {
        &self.store
    }

    pub fn get(&self, id: TimerId) -> Result<&Timer, CommandError> {
        self.store.get(id).ok_or(CommandError::NotFound(id))
    }

    /// Insert a new idle timer
    pub fn create(&mut self, new: NewTimer) -> Result<&Timer, CommandError> {
        if !new.duration.is_finite() || new.duration <= 0.0 {
            return Err(CommandError::InvalidDuration(new.duration));
        }
        let volume = match new.volume {
            Some(v) if !(0.0..=1.0).contains(&v) => return Err(CommandError::InvalidVolume(v)),
            Some(v) => v,
            None => DEFAULT_VOLUME,
        };
        let label = if new.label.trim().is_empty() {
            format!("Timer #{}", self.store.len() + 1)
        } else {
            new.label
        };

        let timer = Timer::new(
            label,
            new.duration,
            new.sound,
            new.use_notification,
            new.is_looping,
            volume,
        );
        let id = timer.id;
        info!("Created timer {} ({}s, {})", id, timer.total_duration, timer.label);
        self.store.insert(timer);
        self.get(id)
    }

    /// Switch a timer between running and paused.
    ///
    /// Returns the status after the command. Completed timers stay completed
    /// until they are reset.
    pub fn toggle(&mut self, id: TimerId) -> Result<TimerStatus, CommandError> {
        let timer = self
            .store
            .patch(id, |t| {
                if !t.is_completed {
                    t.is_running = !t.is_running;
                }
            })
            .ok_or(CommandError::NotFound(id))?;
        let status = timer.status();
        debug!("Toggled timer {} to {:?}", id, status);
        Ok(status)
    }

    /// Restore the full duration and stop the timer
    pub fn reset(&mut self, id: TimerId) -> Result<&Timer, CommandError> {
        debug!("Resetting timer {}", id);
        self.store
            .patch(id, |t| {
                t.remaining_time = t.total_duration;
                t.is_running = false;
                t.is_completed = false;
            })
            .ok_or(CommandError::NotFound(id))
    }

    pub fn delete(&mut self, id: TimerId) -> Result<Timer, CommandError> {
        let timer = self.store.remove(id).ok_or(CommandError::NotFound(id))?;
        info!("Deleted timer {} ({})", id, timer.label);
        Ok(timer)
    }

    /// Change a timer's alert volume, clamped to `[0, 1]`
    pub fn set_volume(&mut self, id: TimerId, volume: f64) -> Result<&Timer, CommandError> {
        if !volume.is_finite() {
            return Err(CommandError::InvalidVolume(volume));
        }
        let volume = volume.clamp(0.0, 1.0);
        self.store
            .patch(id, |t| t.volume = volume)
            .ok_or(CommandError::NotFound(id))
    }

    /// Advance every running timer by `delta` seconds.
    ///
    /// Paused and completed timers are left untouched. Non-positive or
    /// non-finite deltas are ignored.
    pub fn tick(&mut self, delta: f64) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        if !delta.is_finite() || delta <= 0.0 {
            return outcome;
        }

        for timer in self.store.iter_mut() {
            if !timer.is_running || timer.is_completed {
                continue;
            }

            let remaining = (timer.remaining_time - delta).max(0.0);
            if remaining <= 0.0 {
                outcome.completions.push(CompletionEvent::for_timer(timer));
                outcome.changed = true;
                if timer.is_looping {
                    info!("Timer {} finished a cycle, restarting", timer.id);
                    timer.remaining_time = timer.total_duration;
                } else {
                    info!("Timer {} completed", timer.id);
                    timer.remaining_time = 0.0;
                    timer.is_running = false;
                    timer.is_completed = true;
                }
            } else if remaining != timer.remaining_time {
                timer.remaining_time = remaining;
                outcome.changed = true;
            }
        }

        outcome
    }
}
