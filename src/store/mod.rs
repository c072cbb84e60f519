//! Session record storage.
//!
//! The generation pipeline writes one [`SessionRecord`] per successful run
//! and never reads it back; the progress tracker and the CLI history read
//! them by user.
//!
//! * [`SessionStore`] — async trait for any backend.
//! * [`MemorySessionStore`] — process-lifetime store.
//! * [`JsonSessionStore`] — single JSON file, rewritten atomically.

pub mod file;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use file::JsonSessionStore;
pub use memory::MemorySessionStore;

/// Value stored in [`SessionRecord::kind`] for pipeline-produced sessions.
pub const GENERATED_KIND: &str = "ai-generated";

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A session as submitted by the pipeline, before the store assigns an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSession {
    pub user_id: String,
    pub generated: bool,
    pub kind: String,
    pub duration_seconds: u32,
    pub mood_tags: Vec<String>,
    pub outcome_tags: Vec<String>,
    pub audio_locator: Option<String>,
    pub script: Option<String>,
}

/// A persisted meditation session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    pub user_id: String,
    pub generated: bool,
    pub kind: String,
    pub duration_seconds: u32,
    pub mood_tags: Vec<String>,
    pub outcome_tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_locator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Stamp `new` with a fresh id and `created_at`.
    pub fn from_new(new: NewSession, created_at: DateTime<Utc>) -> Self {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        Self {
            session_id: format!("session_{}_{}", created_at.timestamp_millis(), &suffix[..9]),
            user_id: new.user_id,
            generated: new.generated,
            kind: new.kind,
            duration_seconds: new.duration_seconds,
            mood_tags: new.mood_tags,
            outcome_tags: new.outcome_tags,
            audio_locator: new.audio_locator,
            script: new.script,
            created_at,
        }
    }
}

/// A wallet-identified user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: String,
    pub wallet_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_status: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Users are keyed by wallet address; the address doubles as the user id.
    pub fn new(wallet_address: &str, created_at: DateTime<Utc>) -> Self {
        Self {
            user_id: wallet_address.to_string(),
            wallet_address: wallet_address.to_string(),
            subscription_status: None,
            created_at,
        }
    }
}

/// Everything a backend holds. Shared by both implementations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct StoreData {
    #[serde(default)]
    pub sessions: Vec<SessionRecord>,
    #[serde(default)]
    pub users: Vec<UserRecord>,
}

impl StoreData {
    pub fn sessions_for(&self, user_id: &str) -> Vec<SessionRecord> {
        self.sessions
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn user(&self, wallet_address: &str) -> Option<&UserRecord> {
        self.users.iter().find(|u| u.wallet_address == wallet_address)
    }

    /// Insert a user unless one already exists for the address.
    pub fn upsert_user(&mut self, wallet_address: &str) -> (UserRecord, bool) {
        if let Some(existing) = self.user(wallet_address) {
            return (existing.clone(), false);
        }
        let user = UserRecord::new(wallet_address, Utc::now());
        self.users.push(user.clone());
        (user, true)
    }
}

// ---------------------------------------------------------------------------
// StoreError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("store file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// Backend refused or could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

// ---------------------------------------------------------------------------
// SessionStore trait
// ---------------------------------------------------------------------------

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a new session and return the stored record.
    async fn create_session(&self, session: NewSession) -> Result<SessionRecord, StoreError>;

    /// All sessions for `user_id`, in creation order.
    async fn get_sessions(&self, user_id: &str) -> Result<Vec<SessionRecord>, StoreError>;

    /// Create the user for `wallet_address` if it does not exist yet.
    async fn create_user(&self, wallet_address: &str) -> Result<UserRecord, StoreError>;

    async fn get_user(&self, wallet_address: &str) -> Result<Option<UserRecord>, StoreError>;
}

#[cfg(test)]
pub(crate) fn sample_session(user_id: &str, mood: &str, outcome: &str) -> NewSession {
    NewSession {
        user_id: user_id.to_string(),
        generated: true,
        kind: GENERATED_KIND.to_string(),
        duration_seconds: 900,
        mood_tags: vec![mood.to_string()],
        outcome_tags: vec![outcome.to_string()],
        audio_locator: Some("data:audio/mpeg;base64,AAAA".into()),
        script: Some("Breathe in.".into()),
    }
}
