//! View phases for the meditation session screen.

use thiserror::Error;

use crate::catalog::OptionSet;
use crate::pipeline::GenerationError;

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// Phases of the session screen.
///
/// ```text
/// Selecting ──generate──▶ Generating ──ok──▶ Playing
///     ▲                       │                 │
///     └──────── error ────────┘                 │
///     └────────────── create another ───────────┘
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewState {
    /// Choosing current mood and desired outcome.
    #[default]
    Selecting,

    /// The pipeline is running; selection and transport are locked.
    Generating,

    /// An asset is loaded and the transport controls are live.
    Playing,
}

impl ViewState {
    /// ```
    /// use calmmind::session::ViewState;
    ///
    /// assert!(!ViewState::Selecting.is_busy());
    /// assert!(ViewState::Generating.is_busy());
    /// assert!(!ViewState::Playing.is_busy());
    /// ```
    pub fn is_busy(&self) -> bool {
        matches!(self, ViewState::Generating)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ViewState::Selecting => "How are you feeling?",
            ViewState::Generating => "Creating your meditation...",
            ViewState::Playing => "Your meditation",
        }
    }
}

impl std::fmt::Display for ViewState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ViewState::Selecting => "selecting",
            ViewState::Generating => "generating",
            ViewState::Playing => "playing",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// ViewError
// ---------------------------------------------------------------------------

/// A view action that was refused or failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("cannot {action} while {state}")]
    WrongState {
        action: &'static str,
        state: ViewState,
    },

    #[error("unknown {set} option `{id}`")]
    UnknownOption { set: OptionSet, id: String },

    #[error("choose how you feel and what you want to achieve first")]
    SelectionIncomplete,

    #[error(transparent)]
    Generation(#[from] GenerationError),
}
