/// In-memory key-value store with TTL
///
/// Expiry is evaluated lazily on read against the injected [`Clock`], so
/// tests can expire entries by advancing a [`crate::clock::FixedClock`].

use super::KeyValueStore;
use crate::clock::{Clock, SystemClock};
use crate::error::StorageError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: DateTime<Utc>,
}

pub struct InMemoryKeyValueStore {
    entries: Mutex<HashMap<String, Entry>>,
    clock: Arc<dyn Clock>,
    unavailable: AtomicBool,
}

impl Default for InMemoryKeyValueStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
            unavailable: AtomicBool::new(false),
        }
    }

    /// While set, every operation fails with a storage error
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Remaining TTL of a live key
    pub fn ttl(&self, key: &str) -> Option<chrono::Duration> {
        let now = self.clock.now();
        self.entries()
            .get(key)
            .filter(|e| e.expires_at > now)
            .map(|e| e.expires_at - now)
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        let now = self.clock.now();
        self.entries().values().filter(|e| e.expires_at > now).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::KeyValue("store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StorageError> {
        self.check_available()?;

        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| StorageError::KeyValue(format!("invalid ttl: {}", e)))?;
        self.entries().insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: self.clock.now() + ttl,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check_available()?;

        let now = self.clock.now();
        let mut entries = self.entries();
        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        self.check_available()?;

        let now = self.clock.now();
        Ok(self
            .entries()
            .remove(key)
            .is_some_and(|entry| entry.expires_at > now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    #[tokio::test]
    async fn test_set_get_delete() {
        let store = InMemoryKeyValueStore::new();
        store.set("k", "v", Duration::from_secs(60)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));

        store.set("k", "w", Duration::from_secs(60)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("w"));

        assert!(store.delete("k").await.unwrap());
        assert_eq!(store.get("k").await.unwrap(), None);
        assert!(!store.delete("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_of_expired_entry_reports_nothing_removed() {
        let clock = FixedClock::new(Utc::now());
        let store = InMemoryKeyValueStore::with_clock(Arc::new(clock.clone()));

        store.set("refresh:abc", "7", Duration::from_secs(60)).await.unwrap();
        clock.advance(chrono::Duration::seconds(60));

        assert!(!store.delete("refresh:abc").await.unwrap());
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let clock = FixedClock::new(Utc::now());
        let store = InMemoryKeyValueStore::with_clock(Arc::new(clock.clone()));

        store.set("otp:7", "123456", Duration::from_secs(300)).await.unwrap();
        assert_eq!(store.ttl("otp:7"), Some(chrono::Duration::seconds(300)));

        clock.advance(chrono::Duration::seconds(299));
        assert!(store.get("otp:7").await.unwrap().is_some());

        clock.advance(chrono::Duration::seconds(1));
        assert!(store.get("otp:7").await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_unavailable() {
        let store = InMemoryKeyValueStore::new();
        store.set_unavailable(true);
        assert!(store.get("k").await.is_err());
        assert!(store.set("k", "v", Duration::from_secs(1)).await.is_err());
    }
}
