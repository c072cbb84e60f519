//! `SpeechSynthesizer` trait and the ElevenLabs-compatible implementation.
//!
//! The synthesizer returns a self-contained `data:` URI so the playback side
//! never needs a second fetch.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use thiserror::Error;

use crate::config::TtsConfig;

/// MIME type requested from and reported for synthesized audio.
pub const AUDIO_MIME: &str = "audio/mpeg";

// ---------------------------------------------------------------------------
// TtsError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum TtsError {
    /// No API key was configured.
    #[error("text-to-speech API key not configured")]
    MissingApiKey,

    #[error("HTTP request failed: {0}")]
    Request(String),

    #[error("text-to-speech request timed out")]
    Timeout,

    /// Non-success status; `detail` is the provider's error message when present.
    #[error("text-to-speech API error ({status}): {detail}")]
    Api { status: u16, detail: String },

    /// The provider answered 2xx with no audio bytes.
    #[error("text-to-speech returned no audio")]
    EmptyAudio,
}

impl From<reqwest::Error> for TtsError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TtsError::Timeout
        } else {
            TtsError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// SpeechSynthesizer trait
// ---------------------------------------------------------------------------

/// Turns a script into a playable audio locator.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Narrate `script` with the `voice` profile and return a resolvable URI.
    async fn synthesize(&self, script: &str, voice: &str) -> Result<String, TtsError>;
}

// ---------------------------------------------------------------------------
// Voice profiles
// ---------------------------------------------------------------------------

/// Known voice profiles and the provider voice ids they map to.
pub const VOICE_PROFILES: [(&str, &str); 3] = [
    ("neutral", "21m00Tcm4TlvDq8ikWAM"),
    ("calm", "AZnzlk1XvdvUeBnXmlld"),
    ("soothing", "EXAVITQu4vr4xnSDxMaL"),
];

/// Resolve a profile key to a provider voice id. Unknown keys use `neutral`.
pub fn voice_id(profile: &str) -> &'static str {
    VOICE_PROFILES
        .iter()
        .find(|(name, _)| *name == profile)
        .map(|(_, id)| *id)
        .unwrap_or(VOICE_PROFILES[0].1)
}

/// Encode raw audio bytes as a `data:` URI.
pub fn to_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Split a `data:<mime>;base64,<payload>` URI back into its parts.
///
/// Returns `None` for anything that is not a base64 data URI.
pub fn decode_data_uri(uri: &str) -> Option<(String, Vec<u8>)> {
    let rest = uri.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime = header.strip_suffix(";base64")?;
    let bytes = STANDARD.decode(payload).ok()?;
    Some((mime.to_string(), bytes))
}

// ---------------------------------------------------------------------------
// ElevenLabsSynthesizer
// ---------------------------------------------------------------------------

/// Calls `POST {base_url}/text-to-speech/{voice_id}`.
pub struct ElevenLabsSynthesizer {
    client: reqwest::Client,
    config: TtsConfig,
}

impl ElevenLabsSynthesizer {
    pub fn from_config(config: &TtsConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    fn endpoint(&self, voice: &str) -> String {
        format!(
            "{}/text-to-speech/{}",
            self.config.base_url.trim_end_matches('/'),
            voice_id(voice)
        )
    }
}

/// Best-effort extraction of the provider's `detail` field.
fn error_detail(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    match &json["detail"] {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Object(map) => map
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string),
        _ => None,
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsSynthesizer {
    async fn synthesize(&self, script: &str, voice: &str) -> Result<String, TtsError> {
        let key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(TtsError::MissingApiKey)?;

        let body = serde_json::json!({
            "text": script,
            "model_id": self.config.model_id,
            "voice_settings": {
                "stability": self.config.stability,
                "similarity_boost": self.config.similarity_boost,
            },
        });

        let response = self
            .client
            .post(self.endpoint(voice))
            .header("Accept", AUDIO_MIME)
            .header("xi-api-key", key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let detail = error_detail(&text)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());
            return Err(TtsError::Api {
                status: status.as_u16(),
                detail,
            });
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(TtsError::EmptyAudio);
        }

        log::debug!("tts: synthesized {} bytes with voice {voice}", bytes.len());
        Ok(to_data_uri(AUDIO_MIME, &bytes))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
