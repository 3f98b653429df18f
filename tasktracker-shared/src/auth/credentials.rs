/// Credential service
///
/// Passwordless login for the HTTP surface:
///
/// 1. The bot calls [`CredentialService::request_code`] and shows the user a
///    six-digit code, valid for five minutes.
/// 2. The client exchanges `(user_id, code)` for a [`TokenPair`] via
///    [`CredentialService::login`].
/// 3. Access tokens are short-lived JWTs; refresh tokens are opaque and
///    single-use ([`CredentialService::refresh`] rotates them).
/// 4. [`CredentialService::logout`] revokes both; a revoked access token is
///    rejected by [`CredentialService::verify_access`] until it would have
///    expired anyway.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tasktracker_shared::auth::{CredentialConfig, CredentialService};
/// use tasktracker_shared::clock::SystemClock;
/// use tasktracker_shared::kv::InMemoryKeyValueStore;
/// use tasktracker_shared::repository::InMemoryTaskRepository;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let service = CredentialService::new(
///     Arc::new(InMemoryKeyValueStore::new()),
///     Arc::new(InMemoryTaskRepository::new()),
///     Arc::new(SystemClock),
///     CredentialConfig::new("a-secret-that-is-at-least-32-bytes!!")?,
/// );
///
/// let code = service.request_code(42).await?;
/// let pair = service.login(42, &code).await?;
/// assert_eq!(service.verify_access(&pair.access_token).await?, 42);
/// # Ok(())
/// # }
/// ```

use crate::auth::jwt::{self, Claims, JwtError};
use crate::clock::Clock;
use crate::config::{self, ConfigError};
use crate::error::StorageError;
use crate::kv::KeyValueStore;
use crate::repository::TaskRepository;
use chrono::Duration;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid or expired code")]
    InvalidCode,

    #[error("Invalid or expired refresh token")]
    InvalidRefreshToken,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token has expired")]
    Expired,

    #[error("Token has been revoked")]
    Revoked,

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Failed to issue token: {0}")]
    TokenCreation(String),
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::Expired,
            JwtError::CreateError(msg) => AuthError::TokenCreation(msg),
            other => AuthError::InvalidToken(other.to_string()),
        }
    }
}

/// Secret and lifetimes for issued credentials
#[derive(Clone)]
pub struct CredentialConfig {
    pub jwt_secret: String,
    pub code_ttl: Duration,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl CredentialConfig {
    /// Default lifetimes: code 5 minutes, access 15 minutes, refresh 30 days
    pub fn new(jwt_secret: impl Into<String>) -> Result<Self, ConfigError> {
        let jwt_secret = jwt_secret.into();
        if jwt_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Invalid {
                name: "JWT_SECRET",
                reason: format!("must be at least {} characters", MIN_SECRET_LEN),
            });
        }

        Ok(Self {
            jwt_secret,
            code_ttl: Duration::minutes(5),
            access_ttl: Duration::minutes(15),
            refresh_ttl: Duration::days(30),
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(config::required("JWT_SECRET")?)
    }
}

impl std::fmt::Debug for CredentialConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialConfig")
            .field("jwt_secret", &"***")
            .field("code_ttl", &self.code_ttl)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

/// Credentials returned by login and refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct CredentialService {
    kv: Arc<dyn KeyValueStore>,
    repo: Arc<dyn TaskRepository>,
    clock: Arc<dyn Clock>,
    config: CredentialConfig,
}

impl CredentialService {
    pub fn new(
        kv: Arc<dyn KeyValueStore>,
        repo: Arc<dyn TaskRepository>,
        clock: Arc<dyn Clock>,
        config: CredentialConfig,
    ) -> Self {
        Self {
            kv,
            repo,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &CredentialConfig {
        &self.config
    }

    /// Issues a fresh six-digit code, replacing any earlier one
    pub async fn request_code(&self, user_id: i64) -> Result<String, AuthError> {
        let code = generate_code();
        let expires_at = self.clock.now() + self.config.code_ttl;

        self.kv
            .set(&code_key(user_id), &code, to_std(self.config.code_ttl))
            .await?;
        self.repo
            .save_one_time_code(user_id, &hash_code(&code), expires_at)
            .await?;

        tracing::info!(user_id, "One-time code issued");
        Ok(code)
    }

    /// Exchanges a valid code for a token pair
    ///
    /// A wrong code leaves the stored one untouched so the user can retry.
    pub async fn login(&self, user_id: i64, code: &str) -> Result<TokenPair, AuthError> {
        let key = code_key(user_id);

        let matches = match self.kv.get(&key).await? {
            Some(stored) => hash_code(&stored) == hash_code(code.trim()),
            None => false,
        };
        if !matches {
            tracing::warn!(user_id, "Login with invalid code");
            return Err(AuthError::InvalidCode);
        }

        // Only the request that removes the code may redeem it
        if !self.kv.delete(&key).await? {
            tracing::warn!(user_id, "One-time code already redeemed");
            return Err(AuthError::InvalidCode);
        }
        let pair = self.issue_pair(user_id).await?;

        tracing::info!(user_id, "User logged in");
        Ok(pair)
    }

    /// Rotates a refresh token; the presented one stops working
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let key = refresh_key(refresh_token);

        let user_id = match self.kv.get(&key).await? {
            Some(raw) => raw.parse::<i64>().map_err(|e| {
                StorageError::Serialization(format!("refresh token owner {:?}: {}", raw, e))
            })?,
            None => return Err(AuthError::InvalidRefreshToken),
        };

        if !self.kv.delete(&key).await? {
            tracing::warn!(user_id, "Refresh token already rotated");
            return Err(AuthError::InvalidRefreshToken);
        }
        let pair = self.issue_pair(user_id).await?;

        tracing::debug!(user_id, "Refresh token rotated");
        Ok(pair)
    }

    /// Revokes the refresh token and blacklists the access token
    ///
    /// The blacklist entry lives for the token's remaining lifetime (at
    /// least one second). A token that cannot be decoded is blacklisted for
    /// the full access lifetime.
    pub async fn logout(&self, access_token: &str, refresh_token: &str) -> Result<(), AuthError> {
        self.kv.delete(&refresh_key(refresh_token)).await?;

        let now = self.clock.now();
        let ttl = match jwt::decode_token(access_token, &self.config.jwt_secret) {
            Ok(claims) => claims
                .remaining_at(now)
                .unwrap_or_else(|| Duration::seconds(1)),
            Err(_) => self.config.access_ttl,
        };

        self.kv
            .set(&blacklist_key(access_token), "1", to_std(ttl))
            .await?;

        tracing::info!("User logged out");
        Ok(())
    }

    /// Returns the user id of a valid, unrevoked access token
    pub async fn verify_access(&self, access_token: &str) -> Result<i64, AuthError> {
        let claims = jwt::validate_token(access_token, &self.config.jwt_secret, self.clock.now())?;

        if self.kv.get(&blacklist_key(access_token)).await?.is_some() {
            return Err(AuthError::Revoked);
        }

        Ok(claims.sub)
    }

    async fn issue_pair(&self, user_id: i64) -> Result<TokenPair, AuthError> {
        let claims = Claims::new(user_id, self.clock.now(), self.config.access_ttl);
        let access_token = jwt::create_token(&claims, &self.config.jwt_secret)?;

        let refresh_token = Uuid::new_v4().to_string();
        self.kv
            .set(
                &refresh_key(&refresh_token),
                &user_id.to_string(),
                to_std(self.config.refresh_ttl),
            )
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}

fn generate_code() -> String {
    let n: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{:06}", n)
}

/// SHA-256 of a code, hex encoded
pub fn hash_code(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    hex::encode(hasher.finalize())
}

fn code_key(user_id: i64) -> String {
    format!("otp:{}", user_id)
}

fn refresh_key(token: &str) -> String {
    format!("refresh:{}", token)
}

fn blacklist_key(token: &str) -> String {
    format!("blacklist:{}", token)
}

fn to_std(ttl: Duration) -> std::time::Duration {
    ttl.to_std()
        .unwrap_or(std::time::Duration::from_secs(1))
        .max(std::time::Duration::from_secs(1))
}
