/// Authentication endpoints
///
/// The bot hands a user a six-digit code (`/code`); these endpoints turn it
/// into tokens.
///
/// - `POST /v1/auth/login` - exchange `(user_id, code)` for a token pair
/// - `POST /v1/auth/refresh` - rotate a refresh token
/// - `POST /v1/auth/logout` - revoke the presented access token and a refresh token

use crate::{
    app::{AppState, AuthContext},
    error::ApiResult,
    extract::ApiJson,
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;
use tasktracker_shared::auth::TokenPair;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(range(min = 1, message = "user_id must be positive"))]
    pub user_id: i64,

    #[validate(length(equal = 6, message = "Code must be 6 digits"))]
    pub code: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "refresh_token is required"))]
    pub refresh_token: String,
}

/// Login with a one-time code
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/login
/// Content-Type: application/json
///
/// { "user_id": 123456789, "code": "042137" }
/// ```
///
/// # Response
///
/// ```json
/// { "access_token": "eyJ...", "refresh_token": "5b0c..." }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: wrong, expired or already used code
/// - `422 Unprocessable Entity`: malformed fields
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<TokenPair>> {
    req.validate()?;

    let pair = state.credentials.login(req.user_id, req.code.trim()).await?;
    Ok(Json(pair))
}

/// Rotate a refresh token
///
/// The presented refresh token stops working; the response carries its
/// replacement and a fresh access token.
pub async fn refresh(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RefreshRequest>,
) -> ApiResult<Json<TokenPair>> {
    req.validate()?;

    let pair = state.credentials.refresh(&req.refresh_token).await?;
    Ok(Json(pair))
}

/// Logout
///
/// Requires `Authorization: Bearer <access_token>`. Returns `204 No Content`.
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<RefreshRequest>,
) -> ApiResult<StatusCode> {
    req.validate()?;

    state
        .credentials
        .logout(&auth.access_token, &req.refresh_token)
        .await?;

    tracing::info!(user_id = auth.user_id, "Logged out via API");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_validation() {
        let ok = LoginRequest {
            user_id: 7,
            code: "123456".to_string(),
        };
        assert!(ok.validate().is_ok());

        let short = LoginRequest {
            user_id: 7,
            code: "123".to_string(),
        };
        assert!(short.validate().is_err());

        let bad_user = LoginRequest {
            user_id: 0,
            code: "123456".to_string(),
        };
        assert!(bad_user.validate().is_err());
    }
}
