//! Platform audio primitive seam.
//!
//! A front end implements [`MediaBackend`] to open its native player for an
//! audio locator and forwards the player's notifications as [`MediaEvent`]s.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum MediaError {
    /// The platform refused to start playback (e.g. autoplay policy).
    #[error("playback was blocked: {0}")]
    PlayRejected(String),

    /// The locator could not be loaded.
    #[error("cannot open audio source: {0}")]
    Open(String),
}

/// Notifications a real media element reports back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaEvent {
    /// Metadata is ready; `duration_seconds` may differ from the requested length.
    MetadataLoaded { duration_seconds: f64 },
    /// Playback position advanced.
    TimeUpdate { position_seconds: f64 },
    /// Playback reached the end.
    Ended,
    /// The element started playing.
    Playing,
    /// The element paused, including pauses the platform initiated itself.
    Paused,
}

/// A loaded, controllable audio source.
#[async_trait]
pub trait MediaElement: Send {
    /// Begin or resume playback. May be rejected by the platform.
    async fn play(&mut self) -> Result<(), MediaError>;

    fn pause(&mut self);

    /// Jump to `seconds` from the start.
    fn set_position(&mut self, seconds: f64);

    fn set_volume(&mut self, volume: f32);
}

/// Opens media elements for audio locators.
pub trait MediaBackend: Send + Sync {
    fn open(&self, locator: &str) -> Result<Box<dyn MediaElement>, MediaError>;
}

// Compile-time assertion: the seams must be usable as trait objects.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn MediaElement>, _: Box<dyn MediaBackend>) {}
};
