/// Key-value capability
///
/// Short-lived state (one-time codes, refresh tokens, the access-token
/// blacklist, conversation sessions) lives behind [`KeyValueStore`]: string
/// keys, string values, and a TTL on every write.
///
/// - [`crate::redis::RedisClient`]: production store
/// - [`memory::InMemoryKeyValueStore`]: in-process store honouring TTLs
///
/// # Key Layout
///
/// ```text
/// otp:{user_id}          one-time login code      (5 min)
/// refresh:{token}        refresh token -> user id (30 days)
/// blacklist:{token}      revoked access token     (remaining lifetime)
/// session:{user_id}      conversation state       (configurable)
/// ```

use crate::error::StorageError;
use async_trait::async_trait;
use std::time::Duration;

pub mod memory;

pub use memory::InMemoryKeyValueStore;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Stores `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StorageError>;

    /// `None` when the key is missing or expired
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Removes `key`; removing a missing key succeeds
    ///
    /// Returns `true` only for the caller that actually removed a live
    /// entry, so concurrent consumers of a single-use key can tell which
    /// of them won.
    async fn delete(&self, key: &str) -> Result<bool, StorageError>;
}
