//! Fixed option sets offered on the selection screen.
//!
//! Ids are what the view stores and what ends up in a session's
//! `mood_tags` / `outcome_tags`; labels are what the prompts see.

use serde::Serialize;

/// One selectable mood or outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoodOption {
    pub id: &'static str,
    pub label: &'static str,
    pub emoji: &'static str,
    pub color: &'static str,
}

const fn option(
    id: &'static str,
    label: &'static str,
    emoji: &'static str,
    color: &'static str,
) -> MoodOption {
    MoodOption {
        id,
        label,
        emoji,
        color,
    }
}

/// "How are you feeling right now?"
pub static CURRENT_MOODS: [MoodOption; 6] = [
    option("stressed", "Stressed", "😰", "red"),
    option("anxious", "Anxious", "😟", "orange"),
    option("unfocused", "Unfocused", "🤯", "yellow"),
    option("tired", "Tired", "😴", "blue"),
    option("restless", "Restless", "😣", "purple"),
    option("overwhelmed", "Overwhelmed", "🤪", "pink"),
];

/// "What would you like to achieve?"
pub static DESIRED_OUTCOMES: [MoodOption; 6] = [
    option("calm", "Calm Down", "😌", "green"),
    option("focus", "Focus", "🎯", "blue"),
    option("sleep", "Sleep", "💤", "indigo"),
    option("energy", "Energize", "⚡", "yellow"),
    option("confidence", "Confidence", "💪", "orange"),
    option("peace", "Inner Peace", "🕯️", "purple"),
];

/// Which of the two option sets an id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionSet {
    CurrentMood,
    DesiredOutcome,
}

impl OptionSet {
    pub fn options(&self) -> &'static [MoodOption] {
        match self {
            OptionSet::CurrentMood => &CURRENT_MOODS,
            OptionSet::DesiredOutcome => &DESIRED_OUTCOMES,
        }
    }

    pub fn find(&self, id: &str) -> Option<&'static MoodOption> {
        self.options().iter().find(|o| o.id == id)
    }
}

impl std::fmt::Display for OptionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionSet::CurrentMood => write!(f, "current mood"),
            OptionSet::DesiredOutcome => write!(f, "desired outcome"),
        }
    }
}

pub fn find_mood(id: &str) -> Option<&'static MoodOption> {
    OptionSet::CurrentMood.find(id)
}

pub fn find_outcome(id: &str) -> Option<&'static MoodOption> {
    OptionSet::DesiredOutcome.find(id)
}
