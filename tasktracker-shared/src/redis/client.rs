/// Redis client wrapper
///
/// Wraps `redis::aio::ConnectionManager` (automatic reconnection) and
/// implements [`KeyValueStore`] on top of it. Every command runs under the
/// configured command timeout.
///
/// # Example
///
/// ```no_run
/// use tasktracker_shared::kv::KeyValueStore;
/// use tasktracker_shared::redis::client::{RedisClient, RedisConfig};
/// use std::time::Duration;
///
/// # async fn example() -> anyhow::Result<()> {
/// let client = RedisClient::new(RedisConfig::from_env()?).await?;
/// client.set("otp:7", "123456", Duration::from_secs(300)).await?;
/// # Ok(())
/// # }
/// ```

use crate::config::{self, ConfigError};
use crate::error::StorageError;
use crate::kv::KeyValueStore;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{Client, FromRedisValue, RedisError};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Redis client errors
#[derive(Error, Debug)]
pub enum RedisClientError {
    /// Connection error
    #[error("Redis connection error: {0}")]
    ConnectionError(String),

    /// Configuration error
    #[error("Redis configuration error: {0}")]
    ConfigError(String),

    /// Health check failed
    #[error("Redis health check failed: {0}")]
    HealthCheckFailed(String),
}

impl From<ConfigError> for RedisClientError {
    fn from(err: ConfigError) -> Self {
        RedisClientError::ConfigError(err.to_string())
    }
}

/// Redis configuration
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Format: redis://[username:password@]host:port[/db]
    pub url: String,

    /// Per-command timeout in seconds
    pub command_timeout_secs: u64,
}

impl RedisConfig {
    /// Reads `REDIS_URL` (required) and `REDIS_COMMAND_TIMEOUT_SECS` (default 10)
    pub fn from_env() -> Result<Self, RedisClientError> {
        config::load_dotenv();

        Ok(Self {
            url: config::required("REDIS_URL")?,
            command_timeout_secs: config::optional("REDIS_COMMAND_TIMEOUT_SECS", 10)?,
        })
    }

    #[cfg(test)]
    pub fn default_for_test() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            command_timeout_secs: 10,
        }
    }
}

#[derive(Clone)]
pub struct RedisClient {
    manager: ConnectionManager,
    config: Arc<RedisConfig>,
}

impl RedisClient {
    /// Connects to Redis
    pub async fn new(config: RedisConfig) -> Result<Self, RedisClientError> {
        let client = Client::open(config.url.as_str()).map_err(|e| {
            RedisClientError::ConfigError(format!("Invalid Redis URL: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            RedisClientError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        tracing::info!(
            "Redis client connected successfully to {}",
            config::sanitize_url(&config.url)
        );

        Ok(Self {
            manager,
            config: Arc::new(config),
        })
    }

    /// Sends PING; `true` on PONG
    pub async fn ping(&self) -> Result<bool, RedisClientError> {
        let mut conn = self.manager.clone();

        let result: Result<String, RedisError> = tokio::time::timeout(
            self.command_timeout(),
            redis::cmd("PING").query_async(&mut conn),
        )
        .await
        .map_err(|_| RedisClientError::HealthCheckFailed("PING command timed out".to_string()))?;

        match result {
            Ok(pong) if pong == "PONG" => Ok(true),
            Ok(other) => {
                tracing::warn!("Redis health check: unexpected response: {}", other);
                Ok(false)
            }
            Err(e) => Err(RedisClientError::HealthCheckFailed(e.to_string())),
        }
    }

    pub fn config(&self) -> &RedisConfig {
        &self.config
    }

    fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.config.command_timeout_secs)
    }

    async fn run<T, F>(&self, command: F) -> Result<T, StorageError>
    where
        T: FromRedisValue,
        F: Future<Output = Result<T, RedisError>>,
    {
        tokio::time::timeout(self.command_timeout(), command)
            .await
            .map_err(|_| StorageError::KeyValue("Redis command timed out".to_string()))?
            .map_err(StorageError::from)
    }
}

#[async_trait]
impl KeyValueStore for RedisClient {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StorageError> {
        let mut conn = self.manager.clone();
        // EX takes whole seconds and rejects 0
        let seconds = ttl.as_secs().max(1);

        self.run::<(), _>(
            redis::cmd("SET")
                .arg(key)
                .arg(value)
                .arg("EX")
                .arg(seconds)
                .query_async(&mut conn),
        )
        .await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut conn = self.manager.clone();
        self.run(redis::cmd("GET").arg(key).query_async(&mut conn)).await
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        let mut conn = self.manager.clone();
        // DEL is atomic; the count tells concurrent callers who removed it
        let removed: i64 = self
            .run(redis::cmd("DEL").arg(key).query_async(&mut conn))
            .await?;
        Ok(removed > 0)
    }
}
