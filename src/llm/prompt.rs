//! Prompt builder for meditation titles and scripts.
//!
//! Both prompts are sent as a single user message; labels (not ids) are
//! interpolated so the model sees "Calm Down" rather than `calm`.

use crate::model::GenerationRequest;

/// Builds title and script prompts.
///
/// # Example
/// ```rust
/// use calmmind::llm::PromptBuilder;
///
/// let prompt = PromptBuilder::title("Stressed", "Calm Down");
/// assert!(prompt.contains("\"Stressed\""));
/// ```
pub struct PromptBuilder;

impl PromptBuilder {
    /// Prompt asking for a 3–7 word title.
    pub fn title(mood_label: &str, outcome_label: &str) -> String {
        format!(
            "Create a short, calming title for a meditation session. \
             The user is feeling \"{mood_label}\" and wants to achieve \"{outcome_label}\". \
             Make it 3-7 words long and peaceful."
        )
    }

    /// Prompt asking for the full guided script.
    pub fn script(request: &GenerationRequest) -> String {
        let GenerationRequest {
            mood_label,
            outcome_label,
            duration_minutes,
            addressee,
            ..
        } = request;

        format!(
            "Create a personalized meditation script for someone who is feeling \"{mood_label}\" \
             and wants to achieve \"{outcome_label}\". The meditation should be approximately \
             {duration_minutes} minutes long.

Key requirements:
- Start with a gentle introduction addressing the user by name: \"{addressee}\"
- Guide through breathing exercises and mindfulness
- Include positive affirmations related to their desired outcome
- Use calming, supportive language
- End with a peaceful close
- Keep the script natural and conversational
- Focus on helping them transition from their current mood to their desired state

Please write the full meditation script:"
        )
    }
}
