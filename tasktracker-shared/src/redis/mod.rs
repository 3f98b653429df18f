/// Redis integration
///
/// Redis backs the [`crate::kv::KeyValueStore`] capability in production:
/// one-time codes, refresh tokens, the access-token blacklist and
/// conversation sessions.
///
/// # Example
///
/// ```no_run
/// use tasktracker_shared::redis::{RedisClient, RedisConfig};
///
/// # async fn example() -> anyhow::Result<()> {
/// let client = RedisClient::new(RedisConfig::from_env()?).await?;
/// let healthy = client.ping().await?;
/// println!("Redis healthy: {}", healthy);
/// # Ok(())
/// # }
/// ```

pub mod client;

pub use client::{RedisClient, RedisClientError, RedisConfig};
