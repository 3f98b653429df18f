/// JWT access token encoding and validation
///
/// Access tokens are HS256-signed and carry the user id as `sub`, the
/// issuer `tasktracker`, issue/expiry timestamps, and a random `jti` so two
/// tokens minted in the same second are still distinct strings.
///
/// Expiry is checked against a caller-supplied instant rather than the
/// library's wall clock, so the same rules apply under a test clock.
///
/// # Example
///
/// ```
/// use chrono::{Duration, Utc};
/// use tasktracker_shared::auth::jwt::{create_token, validate_token, Claims};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "a-secret-that-is-at-least-32-bytes!!";
/// let claims = Claims::new(42, Utc::now(), Duration::minutes(15));
/// let token = create_token(&claims, secret)?;
///
/// let validated = validate_token(&token, secret, Utc::now())?;
/// assert_eq!(validated.sub, 42);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const ISSUER: &str = "tasktracker";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Failed to create token: {0}")]
    CreateError(String),

    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    #[error("Token has expired")]
    Expired,

    #[error("Invalid issuer: expected {expected}")]
    InvalidIssuer { expected: String },
}

/// Access token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user id
    pub sub: i64,

    /// Issuer - always "tasktracker"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Unique token id
    pub jti: String,
}

impl Claims {
    pub fn new(user_id: i64, issued_at: DateTime<Utc>, lifetime: Duration) -> Self {
        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + lifetime).timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    /// Time left before expiry, `None` once expired
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Option<Duration> {
        let now = now.timestamp();
        if self.exp > now {
            Some(Duration::seconds(self.exp - now))
        } else {
            None
        }
    }
}

/// Signs claims with HS256
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Checks signature and issuer only
///
/// Used where an expired but authentic token still matters, such as
/// computing how long a logged-out token must stay blacklisted.
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = false;
    validation.validate_nbf = false;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer {
            expected: ISSUER.to_string(),
        },
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

/// Checks signature, issuer and expiry at `now`
pub fn validate_token(token: &str, secret: &str, now: DateTime<Utc>) -> Result<Claims, JwtError> {
    let claims = decode_token(token, secret)?;

    if claims.is_expired_at(now) {
        return Err(JwtError::Expired);
    }

    Ok(claims)
}
