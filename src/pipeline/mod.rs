//! Session generation pipeline.
//!
//! # Architecture
//!
//! ```text
//! SessionView::generate()
//!        │
//!        ▼
//! GenerationPipeline::generate()      ← single in-flight slot
//!        │
//!        ├─ TextGenerator::generate_title     (falls back, never fails)
//!        ├─ TextGenerator::generate_script    → ScriptGenerationFailed
//!        ├─ SpeechSynthesizer::synthesize     → AudioSynthesisFailed
//!        └─ SessionStore::create_session      (failure logged only)
//!        │
//!        ▼
//! MeditationAsset → SessionView (Playing)
//! ```

pub mod generation;

#[cfg(test)]
pub(crate) mod testing;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use generation::{GenerationError, GenerationPipeline, FALLBACK_SCRIPT, FALLBACK_TITLE};
