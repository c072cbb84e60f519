//! Text generation for meditation titles and scripts.
//!
//! This module provides:
//! * [`TextGenerator`] — async trait implemented by all generator backends.
//! * [`ApiTextGenerator`] — OpenAI-compatible REST API generator.
//! * [`PromptBuilder`] — builds the title and script prompts.
//! * [`LlmError`] — error variants for LLM operations.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use calmmind::config::AppConfig;
//! use calmmind::llm::{ApiTextGenerator, TextGenerator};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default().with_env_keys();
//!     let generator = ApiTextGenerator::from_config(&config.llm);
//!
//!     let title = generator.generate_title("Stressed", "Calm Down").await.unwrap();
//!     println!("{title}");
//! }
//! ```

pub mod generator;
pub mod prompt;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use generator::{ApiTextGenerator, LlmError, TextGenerator};
pub use prompt::PromptBuilder;
