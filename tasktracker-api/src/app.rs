/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tasktracker_api::{app::{build_router, AppState}, config::Config};
/// use tasktracker_shared::auth::CredentialService;
/// use tasktracker_shared::clock::SystemClock;
/// use tasktracker_shared::db::pool::create_pool;
/// use tasktracker_shared::redis::{RedisClient, RedisConfig};
/// use tasktracker_shared::repository::PgTaskRepository;
/// use tasktracker_shared::service::TaskService;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(config.database.clone()).await?;
/// let redis = Arc::new(RedisClient::new(RedisConfig::from_env()?).await?);
/// let repo = Arc::new(PgTaskRepository::new(pool.clone()));
/// let clock = Arc::new(SystemClock);
///
/// let state = AppState::new(
///     TaskService::new(repo.clone(), clock.clone()),
///     CredentialService::new(redis, repo, clock, config.credentials.clone()),
///     config,
/// )
/// .with_database(pool);
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tasktracker_shared::auth::CredentialService;
use tasktracker_shared::service::TaskService;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub tasks: TaskService,
    pub credentials: CredentialService,

    /// Probed by the health check when present
    pub db: Option<PgPool>,

    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(tasks: TaskService, credentials: CredentialService, config: Config) -> Self {
        Self {
            tasks,
            credentials,
            db: None,
            config: Arc::new(config),
        }
    }

    pub fn with_database(mut self, db: PgPool) -> Self {
        self.db = Some(db);
        self
    }
}

/// Identity of the caller, inserted by [`require_access`]
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: i64,

    /// The bearer token the request presented
    pub access_token: String,
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── GET /health
/// └── /v1/
///     ├── /auth/
///     │   ├── POST /login
///     │   ├── POST /refresh
///     │   └── POST /logout        (bearer token)
///     └── /tasks/                 (bearer token)
///         ├── GET    /
///         ├── POST   /
///         └── DELETE /:id
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    let protected_auth_routes = Router::new()
        .route("/logout", post(routes::auth::logout))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_access,
        ));

    let task_routes = Router::new()
        .route(
            "/",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route("/:id", delete(routes::tasks::delete_task))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_access,
        ));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes.merge(protected_auth_routes))
        .nest("/tasks", task_routes);

    let cors = if state.config.api.allows_any_origin() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Rejects requests without a valid, unrevoked access token
///
/// On success the caller's [`AuthContext`] is available to handlers via
/// `Extension<AuthContext>`.
pub async fn require_access(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&req)?.to_string();

    let user_id = state.credentials.verify_access(&token).await?;

    req.extensions_mut().insert(AuthContext {
        user_id,
        access_token: token,
    });

    Ok(next.run(req).await)
}

fn bearer_token(req: &Request) -> Result<&str, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Expected Bearer token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request(auth: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri("/v1/tasks");
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(&request(Some("Bearer abc"))).unwrap(), "abc");
        assert!(matches!(
            bearer_token(&request(None)),
            Err(ApiError::Unauthorized(_))
        ));
        assert!(matches!(
            bearer_token(&request(Some("Basic abc"))),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            bearer_token(&request(Some("Bearer "))),
            Err(ApiError::BadRequest(_))
        ));
    }
}
