//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across tasks.
//! Every section carries `#[serde(default)]` so a partial `settings.toml`
//! only overrides the keys it names.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::AppPaths;

/// Environment variable consulted when `llm.api_key` is unset.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable consulted when `tts.api_key` is unset.
pub const ELEVENLABS_API_KEY_ENV: &str = "ELEVENLABS_API_KEY";

// ---------------------------------------------------------------------------
// LlmConfig
// ---------------------------------------------------------------------------

/// Settings for title and script generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API (no trailing `/v1`).
    pub base_url: String,
    /// API key. `None` for local providers.
    pub api_key: Option<String>,
    /// Model identifier sent to the API.
    pub model: String,
    /// Sampling temperature (0.0 – 1.0).
    pub temperature: f32,
    /// Token cap for title requests.
    pub title_max_tokens: u32,
    /// Token cap for script requests.
    pub script_max_tokens: u32,
    /// Maximum seconds to wait for a completion.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".into(),
            api_key: None,
            model: "gpt-3.5-turbo".into(),
            temperature: 0.7,
            title_max_tokens: 50,
            script_max_tokens: 1500,
            timeout_secs: 60,
        }
    }
}

// ---------------------------------------------------------------------------
// TtsConfig
// ---------------------------------------------------------------------------

/// Settings for the text-to-speech provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    /// Base URL including the API version segment.
    pub base_url: String,
    /// `xi-api-key` value. Synthesis fails without one.
    pub api_key: Option<String>,
    /// Synthesis model identifier.
    pub model_id: String,
    pub stability: f32,
    pub similarity_boost: f32,
    /// Maximum seconds to wait for the audio body.
    pub timeout_secs: u64,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.elevenlabs.io/v1".into(),
            api_key: None,
            model_id: "eleven_monolingual_v1".into(),
            stability: 0.5,
            similarity_boost: 0.5,
            timeout_secs: 120,
        }
    }
}

// ---------------------------------------------------------------------------
// SpeechMode
// ---------------------------------------------------------------------------

/// Whether generated scripts are narrated.
///
/// | Variant  | Audio step       | Script failure        | Playback  |
/// |----------|------------------|-----------------------|-----------|
/// | Narrated | text-to-speech   | aborts generation     | real media|
/// | Silent   | skipped          | fixed fallback script | simulated |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeechMode {
    Narrated,
    Silent,
}

impl Default for SpeechMode {
    fn default() -> Self {
        Self::Narrated
    }
}

// ---------------------------------------------------------------------------
// GenerationConfig
// ---------------------------------------------------------------------------

/// Inputs fixed for every generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Target meditation length in minutes.
    pub duration_minutes: u32,
    /// Voice profile key passed to the synthesizer (`neutral`, `calm`, `soothing`).
    pub voice: String,
    /// Name the script addresses the listener by.
    pub addressee: String,
    pub speech: SpeechMode,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            duration_minutes: 15,
            voice: "neutral".into(),
            addressee: "Friend".into(),
            speech: SpeechMode::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// PlaybackConfig
// ---------------------------------------------------------------------------

/// Transport defaults for the playback controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Initial volume (0.0 – 1.0).
    pub default_volume: f32,
    /// Seconds moved by the skip-back / skip-forward controls.
    pub skip_secs: f64,
    /// Simulated clock period in milliseconds. Each tick advances one second.
    pub tick_millis: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            default_volume: 0.8,
            skip_secs: 15.0,
            tick_millis: 1000,
        }
    }
}

// ---------------------------------------------------------------------------
// StoreConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Records live for the process lifetime only.
    Memory,
    /// Records are kept in a JSON file.
    File,
}

impl Default for StoreBackend {
    fn default() -> Self {
        Self::File
    }
}

/// Where session records are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Override for the JSON store location. `None` uses [`AppPaths::sessions_file`].
    pub path: Option<PathBuf>,
}

impl StoreConfig {
    /// Resolved JSON store path.
    pub fn sessions_file(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| AppPaths::new().sessions_file)
    }
}

// ---------------------------------------------------------------------------
// Theme / UiConfig
// ---------------------------------------------------------------------------

/// Colour theme applied by the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Default,
    Celo,
    Solana,
    Base,
    Coinbase,
}

impl Theme {
    pub const ALL: [Theme; 5] = [
        Theme::Default,
        Theme::Celo,
        Theme::Solana,
        Theme::Base,
        Theme::Coinbase,
    ];

    /// Value written to the front end's `data-theme` attribute.
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Default => "default",
            Theme::Celo => "celo",
            Theme::Solana => "solana",
            Theme::Base => "base",
            Theme::Coinbase => "coinbase",
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::Default
    }
}

#[derive(Debug, Clone, Error)]
#[error("unknown theme `{0}` (expected one of: default, celo, solana, base, coinbase)")]
pub struct UnknownTheme(pub String);

impl FromStr for Theme {
    type Err = UnknownTheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Theme::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| UnknownTheme(s.to_string()))
    }
}

/// Presentation settings handed to the session view at construction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub theme: Theme,
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use calmmind::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Title / script generation settings.
    pub llm: LlmConfig,
    /// Speech synthesis settings.
    pub tts: TtsConfig,
    /// Per-request generation inputs.
    pub generation: GenerationConfig,
    /// Transport defaults.
    pub playback: PlaybackConfig,
    /// Session record storage.
    pub store: StoreConfig,
    /// Presentation settings.
    pub ui: UiConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// so callers never need to special-case a missing file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Fill unset API keys from the process environment.
    ///
    /// Keys already present in the file win over the environment.
    pub fn with_env_keys(self) -> Self {
        self.with_keys_from(|name| std::env::var(name).ok())
    }

    fn with_keys_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        if self.llm.api_key.is_none() {
            self.llm.api_key = non_empty(lookup(OPENAI_API_KEY_ENV));
        }
        if self.tts.api_key.is_none() {
            self.tts.api_key = non_empty(lookup(ELEVENLABS_API_KEY_ENV));
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
