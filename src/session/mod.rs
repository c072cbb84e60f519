//! The session screen as a state machine.
//!
//! * [`ViewState`] — `Selecting` / `Generating` / `Playing`.
//! * [`SessionView`] — owns the selection, the generated asset and its
//!   [`PlaybackController`](crate::playback::PlaybackController).
//! * [`ViewError`] — why a view action was refused.

pub mod state;
pub mod view;

pub use state::{ViewError, ViewState};
pub use view::{SessionView, ViewStatus};
