//! Playback state shared between the controller, the clock and its timer task.
//!
//! [`SharedPlayback`] is `Arc<Mutex<PlaybackState>>`. Lock it for a short
//! critical section and never hold the guard across `.await`.

use std::sync::{Arc, Mutex, MutexGuard};

/// Transport position and volume for one playback session.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub position_seconds: f64,
    pub total_seconds: f64,
    /// 0.0 – 1.0
    pub volume: f32,
}

impl PlaybackState {
    pub fn new(total_seconds: f64, volume: f32) -> Self {
        Self {
            is_playing: false,
            position_seconds: 0.0,
            total_seconds: total_seconds.max(0.0),
            volume: volume.clamp(0.0, 1.0),
        }
    }

    /// Clamp `seconds` into `[0, total_seconds]`.
    pub fn clamp_position(&self, seconds: f64) -> f64 {
        if seconds.is_nan() {
            return 0.0;
        }
        seconds.clamp(0.0, self.total_seconds)
    }

    /// Elapsed share of the session, 0 – 100.
    pub fn progress_percent(&self) -> f64 {
        if self.total_seconds > 0.0 {
            (self.position_seconds / self.total_seconds * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        }
    }

    /// `"m:ss / m:ss"` as shown under the progress ring.
    pub fn time_label(&self) -> String {
        format!(
            "{} / {}",
            format_time(self.position_seconds),
            format_time(self.total_seconds)
        )
    }
}

/// Format whole seconds as `m:ss`.
///
/// ```
/// use calmmind::playback::format_time;
///
/// assert_eq!(format_time(0.0), "0:00");
/// assert_eq!(format_time(65.7), "1:05");
/// assert_eq!(format_time(900.0), "15:00");
/// ```
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

/// Thread-safe handle to [`PlaybackState`].
pub type SharedPlayback = Arc<Mutex<PlaybackState>>;

pub fn new_shared_playback(state: PlaybackState) -> SharedPlayback {
    Arc::new(Mutex::new(state))
}

/// Lock the shared state, recovering from poisoning.
///
/// The state is plain data with no cross-field invariant that a panicking
/// writer could half-apply, so the inner value is always usable.
pub(crate) fn lock(state: &SharedPlayback) -> MutexGuard<'_, PlaybackState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}
