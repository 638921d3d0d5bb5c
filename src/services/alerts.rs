//! Alert dispatcher turning completion events into sounds and notifications
//!
//! Delivery is best effort. A failed sound or a missing notification
//! permission is logged and otherwise ignored; it never reaches the engine.

use std::future::Future;
use tracing::{debug, warn};

use crate::{error::AlertError, state::{CompletionEvent, SoundType}};

/// Title of the notification shown when a timer completes
pub const NOTIFICATION_TITLE: &str = "Timer finished!";

/// Audio backend. Playback is fire-and-forget: `play` must return promptly.
pub trait SoundPlayer: Send + Sync + 'static {
    fn play(&self, sound: SoundType, volume: f64) -> Result<(), AlertError>;
}

/// Whether the user allowed system notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationPermission {
    Granted,
    Denied,
}

/// System notification backend
pub trait Notifier: Send + Sync + 'static {
    fn permission(&self) -> NotificationPermission;

    fn notify(&self, title: &str, body: &str)
        -> impl Future<Output = Result<(), AlertError>> + Send;
}

/// Delivers completion alerts through the injected backends
#[derive(Debug)]
pub struct AlertDispatcher<S, N> {
    sound: S,
    notifier: N,
}

impl<S: SoundPlayer, N: Notifier> AlertDispatcher<S, N> {
    pub fn new(sound: S, notifier: N) -> Self {
        Self { sound, notifier }
    }

    /// Alert the user about one completion
    pub async fn dispatch(&self, event: &CompletionEvent) {
        if let Err(e) = self.sound.play(event.sound, event.volume) {
            warn!("Failed to play {} sound for timer {}: {}", event.sound, event.timer_id, e);
        }

        if !event.notify {
            return;
        }

        if self.notifier.permission() != NotificationPermission::Granted {
            debug!("Notification permission not granted, skipping timer {}", event.timer_id);
            return;
        }

        let body = format!("{} has finished counting down.", event.label);
        if let Err(e) = self.notifier.notify(NOTIFICATION_TITLE, &body).await {
            warn!("Failed to notify completion of timer {}: {}", event.timer_id, e);
        }
    }
}
