/// Environment-driven configuration helpers
///
/// Each component owns a typed config struct with a `from_env()` constructor
/// built on these helpers. A `.env` file is honoured when present.
///
/// # Environment Variables
///
/// | Variable | Used by | Default |
/// |----------|---------|---------|
/// | `DATABASE_URL` | all | required |
/// | `DATABASE_MAX_CONNECTIONS` | all | 10 |
/// | `REDIS_URL` | all | required |
/// | `REDIS_COMMAND_TIMEOUT_SECS` | all | 10 |
/// | `TELEGRAM_TOKEN` | bot, worker | required |
/// | `TELEGRAM_API_URL` | bot, worker | `https://api.telegram.org` |
/// | `TELEGRAM_POLL_TIMEOUT_SECS` | bot | 30 |
/// | `TELEGRAM_REQUEST_TIMEOUT_SECS` | bot, worker | 10 |
/// | `JWT_SECRET` | bot, api | required (32+ chars) |
/// | `LOG_FORMAT` | all | `pretty` |

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Loads `.env` if present
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

/// Reads a required variable
pub fn required(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name)),
    }
}

/// Reads an optional variable, falling back to `default` when unset
pub fn optional<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw.trim().parse().map_err(|e: T::Err| {
            ConfigError::Invalid {
                name,
                reason: e.to_string(),
            }
        }),
        _ => Ok(default),
    }
}

/// Removes `user:password@` from a connection URL before logging it
pub fn sanitize_url(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        if let Some(scheme_end) = url.find("://") {
            let scheme = &url[..scheme_end + 3];
            let host = &url[at_pos + 1..];
            return format!("{}***:***@{}", scheme, host);
        }
    }
    url.to_string()
}
