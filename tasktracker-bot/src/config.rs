/// Bot configuration
///
/// # Environment Variables
///
/// - `INTAKE_EVENT_TIMEOUT_SECS`: per-event processing budget (default 5)
/// - `SESSION_BACKEND`: `redis` or `memory` (default `redis`)
/// - `SESSION_TTL_HOURS`: idle session lifetime in Redis (default 24)

use std::str::FromStr;
use std::time::Duration;
use tasktracker_shared::config::{self, ConfigError};

/// Capacity of the poller -> intake channel
pub const EVENT_CHANNEL_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionBackend {
    Memory,
    Redis,
}

impl FromStr for SessionBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(SessionBackend::Memory),
            "redis" => Ok(SessionBackend::Redis),
            other => Err(format!("expected \"memory\" or \"redis\", got {:?}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub event_timeout: Duration,
    pub session_backend: SessionBackend,
    pub session_ttl: Duration,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            event_timeout: Duration::from_secs(5),
            session_backend: SessionBackend::Redis,
            session_ttl: Duration::from_secs(24 * 3600),
        }
    }
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let timeout_secs: u64 = config::optional("INTAKE_EVENT_TIMEOUT_SECS", 5)?;
        let ttl_hours: u64 = config::optional("SESSION_TTL_HOURS", 24)?;

        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "INTAKE_EVENT_TIMEOUT_SECS",
                reason: "must be positive".to_string(),
            });
        }

        Ok(Self {
            event_timeout: Duration::from_secs(timeout_secs),
            session_backend: config::optional("SESSION_BACKEND", SessionBackend::Redis)?,
            session_ttl: Duration::from_secs(ttl_hours * 3600),
        })
    }
}
