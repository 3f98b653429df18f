/// Conversation sessions
///
/// A session is the per-user position in the add-task dialogue. The pending
/// title lives inside [`SessionState::AwaitingDeadline`], so a deadline can
/// only be awaited once a non-empty title has been accepted.
///
/// # Backends
///
/// - [`InMemorySessionStore`]: process-local map, lost on restart
/// - [`KvSessionStore`]: JSON under `session:{user_id}` in the key-value
///   store, expiring after a period of inactivity
///
/// Both drop a user's entry when the session returns to `Idle`, so only
/// users mid-dialogue occupy memory.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tasktracker_shared::error::StorageError;
use tasktracker_shared::kv::KeyValueStore;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    AwaitingTitle,
    AwaitingDeadline { title: String },
}

impl SessionState {
    pub fn pending_title(&self) -> Option<&str> {
        match self {
            SessionState::AwaitingDeadline { title } => Some(title),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, SessionState::Idle)
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// The user's session; `Idle` if none is stored
    async fn load(&self, user_id: i64) -> Result<SessionState, StorageError>;

    async fn save(&self, user_id: i64, state: &SessionState) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<i64, SessionState>>,
    unavailable: AtomicBool,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every operation fails with a storage error
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of users with a non-idle session
    pub fn len(&self) -> usize {
        self.sessions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<i64, SessionState>> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::KeyValue("session store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, user_id: i64) -> Result<SessionState, StorageError> {
        self.check_available()?;
        Ok(self.sessions().get(&user_id).cloned().unwrap_or_default())
    }

    async fn save(&self, user_id: i64, state: &SessionState) -> Result<(), StorageError> {
        self.check_available()?;

        let mut sessions = self.sessions();
        if state.is_idle() {
            sessions.remove(&user_id);
        } else {
            sessions.insert(user_id, state.clone());
        }
        Ok(())
    }
}

pub struct KvSessionStore {
    kv: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl KvSessionStore {
    pub fn new(kv: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        Self { kv, ttl }
    }

    fn key(user_id: i64) -> String {
        format!("session:{}", user_id)
    }
}

#[async_trait]
impl SessionStore for KvSessionStore {
    async fn load(&self, user_id: i64) -> Result<SessionState, StorageError> {
        let Some(raw) = self.kv.get(&Self::key(user_id)).await? else {
            return Ok(SessionState::Idle);
        };

        match serde_json::from_str(&raw) {
            Ok(state) => Ok(state),
            Err(e) => {
                // An unreadable session restarts the dialogue
                tracing::warn!(user_id, error = %e, "Discarding unreadable session");
                Ok(SessionState::Idle)
            }
        }
    }

    async fn save(&self, user_id: i64, state: &SessionState) -> Result<(), StorageError> {
        let key = Self::key(user_id);

        if state.is_idle() {
            return self.kv.delete(&key).await.map(|_| ());
        }

        let raw = serde_json::to_string(state)?;
        self.kv.set(&key, &raw, self.ttl).await
    }
}
