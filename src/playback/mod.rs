//! Playback: transport state, the dual-mode media clock and the controller
//! the session view drives.

pub mod clock;
pub mod controller;
pub mod media;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use clock::{ClockMode, MediaClock, PlaybackEvent, SimulatedTimer};
pub use controller::PlaybackController;
pub use media::{MediaBackend, MediaElement, MediaError, MediaEvent};
pub use state::{format_time, new_shared_playback, PlaybackState, SharedPlayback};
