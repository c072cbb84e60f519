//! Test doubles for the provider traits.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::llm::{LlmError, TextGenerator};
use crate::model::GenerationRequest;
use crate::store::{NewSession, SessionRecord, SessionStore, StoreError, UserRecord};
use crate::tts::{SpeechSynthesizer, TtsError};

// ---------------------------------------------------------------------------
// ScriptedText
// ---------------------------------------------------------------------------

/// Returns fixed title/script values; `None` means that call fails.
pub(crate) struct ScriptedText {
    title: Option<String>,
    script: Option<String>,
    gate: Option<Notify>,
    title_calls: AtomicUsize,
    script_calls: AtomicUsize,
    last_request: Mutex<Option<GenerationRequest>>,
}

impl ScriptedText {
    fn new(title: Option<&str>, script: Option<&str>) -> Self {
        Self {
            title: title.map(str::to_string),
            script: script.map(str::to_string),
            gate: None,
            title_calls: AtomicUsize::new(0),
            script_calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn ok(title: &str, script: &str) -> Self {
        Self::new(Some(title), Some(script))
    }

    pub fn failing_title(script: &str) -> Self {
        Self::new(None, Some(script))
    }

    pub fn failing_script(title: &str) -> Self {
        Self::new(Some(title), None)
    }

    /// Script calls block until [`release`](Self::release).
    pub fn gated(mut self) -> Self {
        self.gate = Some(Notify::new());
        self
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn calls(&self) -> usize {
        self.title_calls.load(Ordering::SeqCst) + self.script_calls.load(Ordering::SeqCst)
    }

    pub fn script_calls(&self) -> usize {
        self.script_calls.load(Ordering::SeqCst)
    }

    pub fn last_script_request(&self) -> Option<GenerationRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedText {
    async fn generate_title(&self, _mood: &str, _outcome: &str) -> Result<String, LlmError> {
        self.title_calls.fetch_add(1, Ordering::SeqCst);
        self.title
            .clone()
            .ok_or_else(|| LlmError::Request("connection refused".into()))
    }

    async fn generate_script(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        self.script_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.script.clone().ok_or(LlmError::Timeout)
    }
}

// ---------------------------------------------------------------------------
// ScriptedSpeech
// ---------------------------------------------------------------------------

pub(crate) struct ScriptedSpeech {
    locator: Option<String>,
    calls: AtomicUsize,
    last_voice: Mutex<Option<String>>,
}

impl ScriptedSpeech {
    pub fn ok(locator: &str) -> Self {
        Self {
            locator: Some(locator.to_string()),
            calls: AtomicUsize::new(0),
            last_voice: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            locator: None,
            calls: AtomicUsize::new(0),
            last_voice: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_voice(&self) -> Option<String> {
        self.last_voice.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for ScriptedSpeech {
    async fn synthesize(&self, _script: &str, voice: &str) -> Result<String, TtsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_voice.lock().unwrap() = Some(voice.to_string());
        self.locator.clone().ok_or(TtsError::Api {
            status: 401,
            detail: "invalid api key".into(),
        })
    }
}

// ---------------------------------------------------------------------------
// FailingStore
// ---------------------------------------------------------------------------

/// Rejects every write.
#[derive(Default)]
pub(crate) struct FailingStore {
    attempts: AtomicUsize,
}

impl FailingStore {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionStore for FailingStore {
    async fn create_session(&self, _session: NewSession) -> Result<SessionRecord, StoreError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Unavailable("datastore offline".into()))
    }

    async fn get_sessions(&self, _user_id: &str) -> Result<Vec<SessionRecord>, StoreError> {
        Err(StoreError::Unavailable("datastore offline".into()))
    }

    async fn create_user(&self, _wallet_address: &str) -> Result<UserRecord, StoreError> {
        Err(StoreError::Unavailable("datastore offline".into()))
    }

    async fn get_user(&self, _wallet_address: &str) -> Result<Option<UserRecord>, StoreError> {
        Err(StoreError::Unavailable("datastore offline".into()))
    }
}
