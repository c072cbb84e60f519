//! Transport controls for one [`MeditationAsset`].
//!
//! The controller owns the [`MediaClock`] and decides its mode once, at
//! construction: a real media element when the asset carries an audio
//! locator and the backend can open it, the simulated timer otherwise.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::config::PlaybackConfig;
use crate::model::MeditationAsset;

use super::clock::{ClockMode, MediaClock, PlaybackEvent, SimulatedTimer};
use super::media::{MediaBackend, MediaEvent};
use super::state::{lock, new_shared_playback, PlaybackState, SharedPlayback};

pub struct PlaybackController {
    clock: MediaClock,
    state: SharedPlayback,
    skip_secs: f64,
}

impl PlaybackController {
    pub fn new(
        asset: &MeditationAsset,
        media: Option<&dyn MediaBackend>,
        config: &PlaybackConfig,
        events: mpsc::UnboundedSender<PlaybackEvent>,
    ) -> Self {
        let state = new_shared_playback(PlaybackState::new(
            f64::from(asset.duration_seconds),
            config.default_volume,
        ));

        let mode = match (asset.audio_locator.as_deref(), media) {
            (Some(locator), Some(backend)) => match backend.open(locator) {
                Ok(mut element) => {
                    element.set_volume(lock(&state).volume);
                    ClockMode::RealMedia(element)
                }
                Err(e) => {
                    log::warn!("playback: {e}; falling back to simulated clock");
                    simulated_mode(config)
                }
            },
            (Some(_), None) => {
                log::debug!("playback: no media backend, using simulated clock");
                simulated_mode(config)
            }
            (None, _) => simulated_mode(config),
        };

        let clock = MediaClock::new(mode, Arc::clone(&state), events);
        log::debug!(
            "playback: ready ({}, {}s)",
            if clock.is_simulated() { "simulated" } else { "media" },
            asset.duration_seconds
        );

        Self {
            clock,
            state,
            skip_secs: config.skip_secs,
        }
    }

    pub fn is_simulated(&self) -> bool {
        self.clock.is_simulated()
    }

    /// Copy of the current transport state.
    pub fn snapshot(&self) -> PlaybackState {
        lock(&self.state).clone()
    }

    /// Handle to the live state, for readers that don't own the controller.
    pub fn shared_state(&self) -> SharedPlayback {
        Arc::clone(&self.state)
    }

    pub fn is_playing(&self) -> bool {
        lock(&self.state).is_playing
    }

    /// Pause when playing, start otherwise.
    ///
    /// A rejected start is logged and leaves playback paused.
    pub async fn toggle_play_pause(&mut self) {
        if self.is_playing() {
            self.clock.pause();
            log::debug!("playback: paused at {:.0}s", self.clock.current_position());
            return;
        }

        match self.clock.start().await {
            Ok(()) => log::debug!("playback: playing from {:.0}s", self.clock.current_position()),
            Err(e) => log::warn!("playback: {e}"),
        }
    }

    /// Move by `delta` seconds, clamped to the session. Returns the new position.
    pub fn seek_relative(&mut self, delta: f64) -> f64 {
        let target = self.clock.current_position() + delta;
        self.clock.seek(target)
    }

    pub fn seek_to(&mut self, seconds: f64) -> f64 {
        self.clock.seek(seconds)
    }

    pub fn skip_back(&mut self) -> f64 {
        self.seek_relative(-self.skip_secs)
    }

    pub fn skip_forward(&mut self) -> f64 {
        self.seek_relative(self.skip_secs)
    }

    /// Set the volume, clamped to `[0, 1]`. Returns the applied value.
    pub fn set_volume(&mut self, volume: f32) -> f32 {
        let volume = if volume.is_nan() {
            0.0
        } else {
            volume.clamp(0.0, 1.0)
        };
        lock(&self.state).volume = volume;
        self.clock.set_volume(volume);
        volume
    }

    /// Forward a notification from the real media element.
    pub fn handle_media_event(&mut self, event: MediaEvent) {
        self.clock.handle_media_event(event);
    }

    /// Pause and release the timer or element.
    pub fn stop(&mut self) {
        self.clock.stop();
    }
}

fn simulated_mode(config: &PlaybackConfig) -> ClockMode {
    ClockMode::Simulated(SimulatedTimer::new(Duration::from_millis(
        config.tick_millis.max(1),
    )))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
