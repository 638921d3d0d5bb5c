//! Timer entity and its value types

use std::{fmt, str::FromStr};

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Tolerance used when comparing accumulated floating point seconds
pub const TIME_EPSILON: f64 = 1e-6;

/// Volume applied when none is given at creation or found in a stored record
pub const DEFAULT_VOLUME: f64 = 0.5;

/// Unique identifier of a timer, stable for the timer's whole lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerId(uuid::Uuid);

impl TimerId {
    /// Generate a new random identifier
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for TimerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TimerId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::parse_str(s).map(Self)
    }
}

/// Alert sound played when a timer completes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundType {
    #[default]
    Beep,
    Alarm,
    Digital,
    Cosmic,
}

impl SoundType {
    pub const ALL: [SoundType; 4] = [Self::Beep, Self::Alarm, Self::Digital, Self::Cosmic];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beep => "beep",
            Self::Alarm => "alarm",
            Self::Digital => "digital",
            Self::Cosmic => "cosmic",
        }
    }

    /// Pulse pattern of the sound as (pulse count, gap between pulses in ms).
    ///
    /// Alarm is three bursts of four pulses, played back to back.
    pub fn pattern(&self) -> (u32, u64) {
        match self {
            Self::Beep => (2, 200),
            Self::Alarm => (12, 200),
            Self::Digital => (4, 500),
            Self::Cosmic => (1, 2000),
        }
    }
}

impl fmt::Display for SoundType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SoundType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sound| sound.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown sound: {}", s))
    }
}

/// Lifecycle state derived from a timer's flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
    Completed,
}

/// A single countdown timer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timer {
    pub id: TimerId,
    pub label: String,
    /// Reset target in seconds, always positive
    pub total_duration: f64,
    /// Seconds left, within `[0, total_duration]`
    pub remaining_time: f64,
    pub is_running: bool,
    pub is_completed: bool,
    pub is_looping: bool,
    pub sound: SoundType,
    pub use_notification: bool,
    /// Alert volume within `[0, 1]`
    pub volume: f64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Timer {
    /// Create an idle timer with its full duration remaining
    pub fn new(
        label: String,
        total_duration: f64,
        sound: SoundType,
        use_notification: bool,
        is_looping: bool,
        volume: f64,
    ) -> Self {
        Self {
            id: TimerId::new(),
            label,
            total_duration,
            remaining_time: total_duration,
            is_running: false,
            is_completed: false,
            is_looping,
            sound,
            use_notification,
            volume: volume.clamp(0.0, 1.0),
            // Persisted with millisecond precision
            created_at: Utc::now().trunc_subsecs(3),
        }
    }

    pub fn status(&self) -> TimerStatus {
        if self.is_completed {
            TimerStatus::Completed
        } else if self.is_running {
            TimerStatus::Running
        } else if self.is_at_full_duration() {
            TimerStatus::Idle
        } else {
            TimerStatus::Paused
        }
    }

    /// Whether the timer still has its whole duration ahead of it.
    ///
    /// Remaining time is accumulated from variable deltas, so exact equality
    /// with the total is not reliable.
    pub fn is_at_full_duration(&self) -> bool {
        (self.total_duration - self.remaining_time).abs() <= TIME_EPSILON
    }

    /// Fraction of the duration still remaining, within `[0, 1]`
    pub fn progress(&self) -> f64 {
        if self.total_duration <= 0.0 {
            return 0.0;
        }
        (self.remaining_time / self.total_duration).clamp(0.0, 1.0)
    }

    /// Label to show to the user, falling back to a generic name
    pub fn display_label(&self) -> &str {
        let label = self.label.trim();
        if label.is_empty() { "Timer" } else { label }
    }
}
