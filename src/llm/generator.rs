//! Core `TextGenerator` trait and `ApiTextGenerator` implementation.
//!
//! `ApiTextGenerator` calls any OpenAI-compatible `/v1/chat/completions`
//! endpoint. All connection details come from [`LlmConfig`]; nothing is
//! hardcoded.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::LlmConfig;
use crate::llm::prompt::PromptBuilder;
use crate::model::GenerationRequest;

// ---------------------------------------------------------------------------
// LlmError
// ---------------------------------------------------------------------------

/// Errors that can occur while generating text.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("LLM request timed out")]
    Timeout,

    /// The endpoint answered with a non-success status.
    #[error("LLM API returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse LLM response: {0}")]
    Parse(String),

    /// The LLM returned a response with no usable text content.
    #[error("LLM returned an empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// TextGenerator trait
// ---------------------------------------------------------------------------

/// Async trait for LLM-backed title and script generation.
///
/// Implementors must be `Send + Sync` so they can be shared behind
/// `Arc<dyn TextGenerator>`.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// A short title for a session moving from `mood_label` to `outcome_label`.
    async fn generate_title(&self, mood_label: &str, outcome_label: &str)
        -> Result<String, LlmError>;

    /// The full guided-meditation script for `request`.
    async fn generate_script(&self, request: &GenerationRequest) -> Result<String, LlmError>;
}

// ---------------------------------------------------------------------------
// ApiTextGenerator
// ---------------------------------------------------------------------------

/// Calls an OpenAI-compatible `/v1/chat/completions` endpoint.
pub struct ApiTextGenerator {
    client: reqwest::Client,
    config: LlmConfig,
}

impl ApiTextGenerator {
    /// Build an `ApiTextGenerator` from application config.
    ///
    /// The HTTP client carries the per-request timeout from
    /// `config.timeout_secs`; a default client is used if the builder fails.
    pub fn from_config(config: &LlmConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// Send a single user message and return the trimmed reply.
    async fn complete(&self, prompt: String, max_tokens: u32) -> Result<String, LlmError> {
        let body = serde_json::json!({
            "model":       self.config.model,
            "messages":    [ { "role": "user", "content": prompt } ],
            "max_tokens":  max_tokens,
            "temperature": self.config.temperature,
        });

        let mut req = self.client.post(self.endpoint()).json(&body);

        // Attach Authorization header only when api_key is a non-empty string.
        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        extract_content(&json)
    }
}

/// Pull `choices[0].message.content` out of a chat-completions body.
fn extract_content(json: &serde_json::Value) -> Result<String, LlmError> {
    let content = json["choices"][0]["message"]["content"]
        .as_str()
        .ok_or(LlmError::EmptyResponse)?
        .trim();

    if content.is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(content.to_string())
}

#[async_trait]
impl TextGenerator for ApiTextGenerator {
    async fn generate_title(
        &self,
        mood_label: &str,
        outcome_label: &str,
    ) -> Result<String, LlmError> {
        let prompt = PromptBuilder::title(mood_label, outcome_label);
        self.complete(prompt, self.config.title_max_tokens).await
    }

    async fn generate_script(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        log::debug!(
            "llm: requesting {}-minute script ({} -> {})",
            request.duration_minutes,
            request.mood_label,
            request.outcome_label
        );
        let prompt = PromptBuilder::script(request);
        self.complete(prompt, self.config.script_max_tokens).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
