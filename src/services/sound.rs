//! Terminal bell sound backend

use std::{
    io::{self, Write},
    time::Duration,
};
use tokio::{runtime::Handle, time::sleep};
use tracing::debug;

use super::alerts::SoundPlayer;
use crate::{error::AlertError, state::SoundType};

/// Plays each sound's pulse pattern as BEL characters on stderr
#[derive(Debug, Clone, Copy)]
pub struct TerminalBellPlayer {
    enabled: bool,
}

impl TerminalBellPlayer {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl SoundPlayer for TerminalBellPlayer {
    fn play(&self, sound: SoundType, volume: f64) -> Result<(), AlertError> {
        if !self.enabled {
            return Err(AlertError::Unavailable);
        }
        if volume <= 0.0 {
            debug!("Skipping {} sound at zero volume", sound);
            return Ok(());
        }

        let handle = Handle::try_current().map_err(|_| AlertError::Unavailable)?;
        let (pulses, gap_ms) = sound.pattern();

        handle.spawn(async move {
            for pulse in 0..pulses {
                if pulse > 0 {
                    sleep(Duration::from_millis(gap_ms)).await;
                }
                let mut stderr = io::stderr();
                if let Err(e) = stderr.write_all(b"\x07").and_then(|_| stderr.flush()) {
                    debug!("Terminal bell failed: {}", e);
                    return;
                }
            }
        });

        Ok(())
    }
}
