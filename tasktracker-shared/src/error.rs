/// Error taxonomy shared by every component
///
/// - [`ValidationError`]: bad user input, reported back to the user
/// - [`StorageError`]: the relational store or the key-value store failed
/// - [`DeliveryError`]: the outbound messaging transport failed
/// - [`TaskError`]: what task creation can fail with
///
/// Authentication failures live in [`crate::auth::credentials::AuthError`].

use thiserror::Error;

/// Bad user input (malformed deadline, empty title, deadline in the past)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    /// User-facing message
    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Backing store unavailable or query failed
#[derive(Debug, Error)]
pub enum StorageError {
    /// PostgreSQL error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Key-value store error
    #[error("Key-value store error: {0}")]
    KeyValue(String),

    /// A stored value could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<redis::RedisError> for StorageError {
    fn from(err: redis::RedisError) -> Self {
        StorageError::KeyValue(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Outbound messaging failed
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Could not reach the transport
    #[error("Transport error: {0}")]
    Transport(String),

    /// Transport reachable but refused the message
    #[error("Rejected by transport: {0}")]
    Rejected(String),
}

/// Task creation failure
#[derive(Debug, Error)]
pub enum TaskError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::new("Title must not be empty");
        assert_eq!(err.to_string(), "Title must not be empty");
        assert_eq!(err.message(), "Title must not be empty");
    }

    #[test]
    fn test_task_error_is_transparent() {
        let err: TaskError = ValidationError::new("bad deadline").into();
        assert_eq!(err.to_string(), "bad deadline");

        let err: TaskError = StorageError::KeyValue("connection refused".to_string()).into();
        assert_eq!(err.to_string(), "Key-value store error: connection refused");
    }
}
