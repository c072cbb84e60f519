//! Generation pipeline — selection → title → script → audio → session record.
//!
//! [`GenerationPipeline`] owns the provider handles and a single-slot
//! in-flight guard. One call to [`generate`](GenerationPipeline::generate)
//! runs the steps strictly in order:
//!
//! ```text
//! validate selection + identity      (no external calls on failure)
//!   └─▶ acquire in-flight slot       (AlreadyInFlight if taken)
//!         └─▶ title                  Err → "Peaceful Meditation"
//!               └─▶ script           Err → ScriptGenerationFailed
//!                     └─▶ audio      Err → AudioSynthesisFailed
//!                           └─▶ store Err → warn, asset still returned
//! ```
//!
//! In [`SpeechMode::Silent`] the audio step is skipped, the asset carries no
//! locator, and a failed script degrades to a fixed script instead of
//! aborting.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;

use crate::catalog::{self, OptionSet};
use crate::config::{GenerationConfig, SpeechMode};
use crate::identity::Identity;
use crate::llm::TextGenerator;
use crate::model::{GenerationRequest, MeditationAsset, MoodSelection};
use crate::store::{NewSession, SessionStore, GENERATED_KIND};
use crate::tts::SpeechSynthesizer;

/// Title used whenever title generation fails.
pub const FALLBACK_TITLE: &str = "Peaceful Meditation";

/// Script used in silent mode when script generation fails.
pub const FALLBACK_SCRIPT: &str = "Take a deep breath and relax...";

// ---------------------------------------------------------------------------
// GenerationError
// ---------------------------------------------------------------------------

/// Why a generation produced no asset.
///
/// Every variant's `Display` is suitable for showing to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("choose how you feel and what you want to achieve first")]
    IncompleteSelection,

    #[error("unknown {set} option `{id}`")]
    UnknownOption { set: OptionSet, id: String },

    #[error("connect your wallet to generate a meditation")]
    Unauthenticated,

    #[error("a meditation is already being generated")]
    AlreadyInFlight,

    #[error("could not write your meditation script: {0}")]
    ScriptGenerationFailed(String),

    #[error("could not narrate your meditation: {0}")]
    AudioSynthesisFailed(String),
}

// ---------------------------------------------------------------------------
// InFlightGuard
// ---------------------------------------------------------------------------

/// Holds the pipeline's single generation slot; releases it on drop.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

// ---------------------------------------------------------------------------
// GenerationPipeline
// ---------------------------------------------------------------------------

/// Produces a [`MeditationAsset`] from a mood selection.
///
/// Share it behind an `Arc`; concurrent callers are rejected, not queued.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use calmmind::config::AppConfig;
/// use calmmind::identity::Identity;
/// use calmmind::llm::ApiTextGenerator;
/// use calmmind::model::MoodSelection;
/// use calmmind::pipeline::GenerationPipeline;
/// use calmmind::store::MemorySessionStore;
/// use calmmind::tts::ElevenLabsSynthesizer;
///
/// # async fn example() {
/// let config = AppConfig::default().with_env_keys();
/// let pipeline = GenerationPipeline::new(
///     Arc::new(ApiTextGenerator::from_config(&config.llm)),
///     Arc::new(ElevenLabsSynthesizer::from_config(&config.tts)),
///     Arc::new(MemorySessionStore::new()),
///     config.generation.clone(),
/// );
///
/// let asset = pipeline
///     .generate(&MoodSelection::new("stressed", "calm"), &Identity::connected("0xABC"))
///     .await
///     .unwrap();
/// println!("{}", asset.title);
/// # }
/// ```
pub struct GenerationPipeline {
    text: Arc<dyn TextGenerator>,
    speech: Arc<dyn SpeechSynthesizer>,
    store: Arc<dyn SessionStore>,
    settings: GenerationConfig,
    in_flight: AtomicBool,
}

impl GenerationPipeline {
    pub fn new(
        text: Arc<dyn TextGenerator>,
        speech: Arc<dyn SpeechSynthesizer>,
        store: Arc<dyn SessionStore>,
        settings: GenerationConfig,
    ) -> Self {
        Self {
            text,
            speech,
            store,
            settings,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn settings(&self) -> &GenerationConfig {
        &self.settings
    }

    /// `true` while a [`generate`](Self::generate) call holds the slot.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Resolve the selection into a request, or explain why it cannot be.
    pub fn prepare(&self, selection: &MoodSelection) -> Result<GenerationRequest, GenerationError> {
        if !selection.is_complete() {
            return Err(GenerationError::IncompleteSelection);
        }
        let mood = catalog::find_mood(&selection.current_mood_id).ok_or_else(|| {
            GenerationError::UnknownOption {
                set: OptionSet::CurrentMood,
                id: selection.current_mood_id.clone(),
            }
        })?;
        let outcome = catalog::find_outcome(&selection.desired_outcome_id).ok_or_else(|| {
            GenerationError::UnknownOption {
                set: OptionSet::DesiredOutcome,
                id: selection.desired_outcome_id.clone(),
            }
        })?;

        Ok(GenerationRequest {
            mood_label: mood.label.to_string(),
            outcome_label: outcome.label.to_string(),
            duration_minutes: self.settings.duration_minutes,
            addressee: self.settings.addressee.clone(),
            voice: self.settings.voice.clone(),
        })
    }

    /// Run the full pipeline for one selection.
    pub async fn generate(
        &self,
        selection: &MoodSelection,
        identity: &Identity,
    ) -> Result<MeditationAsset, GenerationError> {
        let request = self.prepare(selection)?;
        let user_id = identity.user_id().ok_or(GenerationError::Unauthenticated)?;
        let _slot = InFlightGuard::acquire(&self.in_flight).ok_or_else(|| {
            log::warn!("pipeline: generation requested while another is in flight");
            GenerationError::AlreadyInFlight
        })?;

        log::debug!(
            "pipeline: generating {} -> {} for {user_id}",
            selection.current_mood_id,
            selection.desired_outcome_id
        );

        // ── 1. Title (never fails the run) ──────────────────────────────
        let title = match self
            .text
            .generate_title(&request.mood_label, &request.outcome_label)
            .await
        {
            Ok(title) if !title.trim().is_empty() => title.trim().to_string(),
            Ok(_) => {
                log::warn!("pipeline: empty title, using fallback");
                FALLBACK_TITLE.to_string()
            }
            Err(e) => {
                log::warn!("pipeline: title generation failed ({e}), using fallback");
                FALLBACK_TITLE.to_string()
            }
        };

        // ── 2. Script ───────────────────────────────────────────────────
        let script = match self.text.generate_script(&request).await {
            Ok(script) => script,
            Err(e) if self.settings.speech == SpeechMode::Silent => {
                log::warn!("pipeline: script generation failed ({e}), using fallback script");
                FALLBACK_SCRIPT.to_string()
            }
            Err(e) => {
                log::error!("pipeline: script generation failed: {e}");
                return Err(GenerationError::ScriptGenerationFailed(e.to_string()));
            }
        };

        // ── 3. Audio ────────────────────────────────────────────────────
        let audio_locator = match self.settings.speech {
            SpeechMode::Silent => None,
            SpeechMode::Narrated => match self.speech.synthesize(&script, &request.voice).await {
                Ok(uri) => Some(uri),
                Err(e) => {
                    log::error!("pipeline: audio synthesis failed: {e}");
                    return Err(GenerationError::AudioSynthesisFailed(e.to_string()));
                }
            },
        };

        // ── 4. Persistence (isolated) ───────────────────────────────────
        let record = NewSession {
            user_id: user_id.to_string(),
            generated: true,
            kind: GENERATED_KIND.to_string(),
            duration_seconds: request.duration_seconds(),
            mood_tags: vec![selection.current_mood_id.clone()],
            outcome_tags: vec![selection.desired_outcome_id.clone()],
            audio_locator: audio_locator.clone(),
            script: Some(script.clone()),
        };
        if let Err(e) = self.store.create_session(record).await {
            log::warn!("pipeline: session record not saved ({e}); continuing to playback");
        }

        log::info!("pipeline: generated \"{title}\"");
        Ok(MeditationAsset {
            title,
            script,
            audio_locator,
            duration_seconds: request.duration_seconds(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::{FailingStore, ScriptedSpeech, ScriptedText};
    use crate::store::MemorySessionStore;

    fn pipeline_with(
        text: Arc<ScriptedText>,
        speech: Arc<ScriptedSpeech>,
        store: Arc<dyn SessionStore>,
        speech_mode: SpeechMode,
    ) -> GenerationPipeline {
        GenerationPipeline::new(
            text,
            speech,
            store,
            GenerationConfig {
                speech: speech_mode,
                ..GenerationConfig::default()
            },
        )
    }

    fn selection() -> MoodSelection {
        MoodSelection::new("stressed", "calm")
    }

    fn wallet() -> Identity {
        Identity::connected("0xABC")
    }

    #[tokio::test]
    async fn happy_path_produces_full_asset_and_one_record() {
        let text = Arc::new(ScriptedText::ok("Release and Restore", "Breathe in slowly."));
        let speech = Arc::new(ScriptedSpeech::ok("data:audio/mpeg;base64,AAAA"));
        let store = Arc::new(MemorySessionStore::new());
        let pipeline = pipeline_with(text, speech.clone(), store.clone(), SpeechMode::Narrated);

        let asset = pipeline.generate(&selection(), &wallet()).await.unwrap();

        assert_eq!(asset.title, "Release and Restore");
        assert_eq!(asset.script, "Breathe in slowly.");
        assert_eq!(
            asset.audio_locator.as_deref(),
            Some("data:audio/mpeg;base64,AAAA")
        );
        assert_eq!(asset.duration_seconds, 900);
        assert_eq!(speech.last_voice().as_deref(), Some("neutral"));

        let records = store.get_sessions("0xABC").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].mood_tags, vec!["stressed".to_string()]);
        assert_eq!(records[0].outcome_tags, vec!["calm".to_string()]);
        assert_eq!(records[0].duration_seconds, 900);
        assert_eq!(records[0].script.as_deref(), Some("Breathe in slowly."));
        assert!(!pipeline.is_in_flight());
    }

    #[tokio::test]
    async fn prompts_receive_labels_not_ids() {
        let text = Arc::new(ScriptedText::ok("t", "s"));
        let pipeline = pipeline_with(
            text.clone(),
            Arc::new(ScriptedSpeech::ok("data:x")),
            Arc::new(MemorySessionStore::new()),
            SpeechMode::Narrated,
        );

        pipeline.generate(&selection(), &wallet()).await.unwrap();

        let req = text.last_script_request().expect("script requested");
        assert_eq!(req.mood_label, "Stressed");
        assert_eq!(req.outcome_label, "Calm Down");
        assert_eq!(req.duration_minutes, 15);
        assert_eq!(req.addressee, "Friend");
    }

    #[tokio::test]
    async fn title_failure_uses_fallback_title() {
        let text = Arc::new(ScriptedText::failing_title("Breathe."));
        let pipeline = pipeline_with(
            text,
            Arc::new(ScriptedSpeech::ok("data:x")),
            Arc::new(MemorySessionStore::new()),
            SpeechMode::Narrated,
        );

        let asset = pipeline.generate(&selection(), &wallet()).await.unwrap();
        assert_eq!(asset.title, FALLBACK_TITLE);
        assert_eq!(asset.title, "Peaceful Meditation");
        assert!(asset.audio_locator.is_some());
    }

    #[tokio::test]
    async fn script_failure_is_fail_fast() {
        let text = Arc::new(ScriptedText::failing_script("A Title"));
        let speech = Arc::new(ScriptedSpeech::ok("data:x"));
        let store = Arc::new(MemorySessionStore::new());
        let pipeline = pipeline_with(text, speech.clone(), store.clone(), SpeechMode::Narrated);

        let sel = selection();
        let err = pipeline.generate(&sel, &wallet()).await.unwrap_err();

        assert!(matches!(err, GenerationError::ScriptGenerationFailed(_)));
        assert_eq!(sel, selection());
        assert_eq!(speech.calls(), 0);
        assert_eq!(store.session_count(), 0);
        assert!(!pipeline.is_in_flight());
    }

    #[tokio::test]
    async fn audio_failure_aborts_before_persistence() {
        let store = Arc::new(MemorySessionStore::new());
        let pipeline = pipeline_with(
            Arc::new(ScriptedText::ok("t", "s")),
            Arc::new(ScriptedSpeech::failing()),
            store.clone(),
            SpeechMode::Narrated,
        );

        let err = pipeline.generate(&selection(), &wallet()).await.unwrap_err();
        assert!(matches!(err, GenerationError::AudioSynthesisFailed(_)));
        assert_eq!(store.session_count(), 0);
    }

    #[tokio::test]
    async fn persistence_failure_still_returns_asset() {
        let store = Arc::new(FailingStore::default());
        let pipeline = pipeline_with(
            Arc::new(ScriptedText::ok("t", "s")),
            Arc::new(ScriptedSpeech::ok("data:x")),
            store.clone(),
            SpeechMode::Narrated,
        );

        let asset = pipeline.generate(&selection(), &wallet()).await.unwrap();
        assert_eq!(asset.audio_locator.as_deref(), Some("data:x"));
        assert_eq!(store.attempts(), 1);
    }

    #[tokio::test]
    async fn unauthenticated_makes_no_calls() {
        let text = Arc::new(ScriptedText::ok("t", "s"));
        let speech = Arc::new(ScriptedSpeech::ok("data:x"));
        let store = Arc::new(MemorySessionStore::new());
        let pipeline = pipeline_with(text.clone(), speech.clone(), store.clone(), SpeechMode::Narrated);

        for identity in [
            Identity::anonymous(),
            Identity {
                id: Some(String::new()),
                is_authenticated: true,
            },
        ] {
            let err = pipeline.generate(&selection(), &identity).await.unwrap_err();
            assert_eq!(err, GenerationError::Unauthenticated);
        }
        assert_eq!(text.calls(), 0);
        assert_eq!(speech.calls(), 0);
        assert_eq!(store.session_count(), 0);
    }

    #[tokio::test]
    async fn incomplete_or_unknown_selection_is_rejected() {
        let text = Arc::new(ScriptedText::ok("t", "s"));
        let pipeline = pipeline_with(
            text.clone(),
            Arc::new(ScriptedSpeech::ok("data:x")),
            Arc::new(MemorySessionStore::new()),
            SpeechMode::Narrated,
        );

        let err = pipeline
            .generate(&MoodSelection::new("stressed", ""), &wallet())
            .await
            .unwrap_err();
        assert_eq!(err, GenerationError::IncompleteSelection);

        let err = pipeline
            .generate(&MoodSelection::new("calm", "calm"), &wallet())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GenerationError::UnknownOption {
                set: OptionSet::CurrentMood,
                ..
            }
        ));
        assert_eq!(text.calls(), 0);
    }

    #[tokio::test]
    async fn second_generation_while_in_flight_is_rejected() {
        let text = Arc::new(ScriptedText::ok("t", "s").gated());
        let store = Arc::new(MemorySessionStore::new());
        let pipeline = Arc::new(pipeline_with(
            text.clone(),
            Arc::new(ScriptedSpeech::ok("data:x")),
            store.clone(),
            SpeechMode::Narrated,
        ));

        let first = {
            let pipeline = Arc::clone(&pipeline);
            tokio::spawn(async move { pipeline.generate(&selection(), &wallet()).await })
        };
        while !pipeline.is_in_flight() {
            tokio::task::yield_now().await;
        }

        let err = pipeline.generate(&selection(), &wallet()).await.unwrap_err();
        assert_eq!(err, GenerationError::AlreadyInFlight);

        text.release();
        let asset = first.await.unwrap().unwrap();
        assert_eq!(asset.title, "t");
        assert_eq!(store.session_count(), 1);
        assert_eq!(text.script_calls(), 1);
        assert!(!pipeline.is_in_flight());
    }

    #[tokio::test]
    async fn slot_is_released_after_failure() {
        let pipeline = pipeline_with(
            Arc::new(ScriptedText::failing_script("t")),
            Arc::new(ScriptedSpeech::ok("data:x")),
            Arc::new(MemorySessionStore::new()),
            SpeechMode::Narrated,
        );
        assert!(pipeline.generate(&selection(), &wallet()).await.is_err());
        // A retry is a fresh attempt, not AlreadyInFlight.
        let err = pipeline.generate(&selection(), &wallet()).await.unwrap_err();
        assert!(matches!(err, GenerationError::ScriptGenerationFailed(_)));
    }

    #[tokio::test]
    async fn silent_mode_skips_audio_and_degrades_script() {
        let speech = Arc::new(ScriptedSpeech::ok("data:x"));
        let store = Arc::new(MemorySessionStore::new());
        let pipeline = pipeline_with(
            Arc::new(ScriptedText::failing_script("Quiet Mind")),
            speech.clone(),
            store.clone(),
            SpeechMode::Silent,
        );

        let asset = pipeline.generate(&selection(), &wallet()).await.unwrap();
        assert_eq!(asset.title, "Quiet Mind");
        assert_eq!(asset.script, FALLBACK_SCRIPT);
        assert!(asset.audio_locator.is_none());
        assert_eq!(speech.calls(), 0);

        let records = store.get_sessions("0xABC").await.unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].audio_locator.is_none());
    }

    #[test]
    fn errors_render_user_facing_messages() {
        assert_eq!(
            GenerationError::Unauthenticated.to_string(),
            "connect your wallet to generate a meditation"
        );
        assert_eq!(
            GenerationError::UnknownOption {
                set: OptionSet::DesiredOutcome,
                id: "joy".into()
            }
            .to_string(),
            "unknown desired outcome option `joy`"
        );
    }
}
