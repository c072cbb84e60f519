//! Value types that flow between the view, the generation pipeline and the
//! provider traits.

/// The user's two picks on the selection screen.
///
/// Empty strings mean "not chosen yet".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoodSelection {
    pub current_mood_id: String,
    pub desired_outcome_id: String,
}

impl MoodSelection {
    pub fn new(current_mood_id: impl Into<String>, desired_outcome_id: impl Into<String>) -> Self {
        Self {
            current_mood_id: current_mood_id.into(),
            desired_outcome_id: desired_outcome_id.into(),
        }
    }

    /// Both fields are set.
    pub fn is_complete(&self) -> bool {
        !self.current_mood_id.trim().is_empty() && !self.desired_outcome_id.trim().is_empty()
    }

    pub fn clear(&mut self) {
        self.current_mood_id.clear();
        self.desired_outcome_id.clear();
    }
}

/// Everything the script generator and synthesizer need for one run.
///
/// Built by the pipeline from a [`MoodSelection`] and the generation
/// settings; consumed once.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub mood_label: String,
    pub outcome_label: String,
    pub duration_minutes: u32,
    pub addressee: String,
    pub voice: String,
}

impl GenerationRequest {
    pub fn duration_seconds(&self) -> u32 {
        self.duration_minutes.saturating_mul(60)
    }
}

/// A generated, playable meditation.
#[derive(Debug, Clone, PartialEq)]
pub struct MeditationAsset {
    pub title: String,
    pub script: String,
    /// Resolvable audio URI. `None` means playback is simulated.
    pub audio_locator: Option<String>,
    pub duration_seconds: u32,
}
