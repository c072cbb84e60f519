//! JSON-file [`SessionStore`].
//!
//! The whole store is one JSON document (`{"sessions": [...], "users": [...]}`).
//! Every write re-serialises it to `<path>.tmp` and renames over the target,
//! so a crash mid-write leaves the previous contents intact.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::{NewSession, SessionRecord, SessionStore, StoreData, StoreError, UserRecord};

pub struct JsonSessionStore {
    path: PathBuf,
    /// Serialises read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl JsonSessionStore {
    /// Open a store at `path`. The file is created on first write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<StoreData, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(StoreData::default()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoreData::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, data: &StoreData) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_vec_pretty(data)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for JsonSessionStore {
    async fn create_session(&self, session: NewSession) -> Result<SessionRecord, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut data = self.load().await?;
        let record = SessionRecord::from_new(session, Utc::now());
        data.sessions.push(record.clone());
        self.save(&data).await?;
        log::info!(
            "store: session {} written to {}",
            record.session_id,
            self.path.display()
        );
        Ok(record)
    }

    async fn get_sessions(&self, user_id: &str) -> Result<Vec<SessionRecord>, StoreError> {
        Ok(self.load().await?.sessions_for(user_id))
    }

    async fn create_user(&self, wallet_address: &str) -> Result<UserRecord, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut data = self.load().await?;
        let (user, created) = data.upsert_user(wallet_address);
        if created {
            self.save(&data).await?;
            log::info!("store: user created for {wallet_address}");
        }
        Ok(user)
    }

    async fn get_user(&self, wallet_address: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.load().await?.user(wallet_address).cloned())
    }
}
