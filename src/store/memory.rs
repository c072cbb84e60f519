//! In-memory [`SessionStore`]. Contents are lost when the process exits.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use super::{NewSession, SessionRecord, SessionStore, StoreData, StoreError, UserRecord};

#[derive(Default)]
pub struct MemorySessionStore {
    data: Mutex<StoreData>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions held for every user.
    pub fn session_count(&self) -> usize {
        self.lock().sessions.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreData> {
        // A poisoned lock only means another caller panicked mid-push; the
        // vectors themselves are still valid.
        self.data.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create_session(&self, session: NewSession) -> Result<SessionRecord, StoreError> {
        let record = SessionRecord::from_new(session, Utc::now());
        self.lock().sessions.push(record.clone());
        log::info!(
            "store: session {} created for {}",
            record.session_id,
            record.user_id
        );
        Ok(record)
    }

    async fn get_sessions(&self, user_id: &str) -> Result<Vec<SessionRecord>, StoreError> {
        Ok(self.lock().sessions_for(user_id))
    }

    async fn create_user(&self, wallet_address: &str) -> Result<UserRecord, StoreError> {
        let (user, created) = self.lock().upsert_user(wallet_address);
        if created {
            log::info!("store: user created for {wallet_address}");
        }
        Ok(user)
    }

    async fn get_user(&self, wallet_address: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.lock().user(wallet_address).cloned())
    }
}
