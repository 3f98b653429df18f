/// Common test utilities for integration tests
///
/// Builds the full router over in-memory backends and a fixed clock, so
/// tests exercise routing, middleware and error mapping without PostgreSQL
/// or Redis.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{TimeZone, Utc};
use serde_json::Value;
use std::sync::Arc;
use tasktracker_api::app::{build_router, AppState};
use tasktracker_api::config::{ApiConfig, Config};
use tasktracker_shared::auth::{CredentialConfig, CredentialService, TokenPair};
use tasktracker_shared::clock::FixedClock;
use tasktracker_shared::db::pool::DatabaseConfig;
use tasktracker_shared::kv::InMemoryKeyValueStore;
use tasktracker_shared::repository::InMemoryTaskRepository;
use tasktracker_shared::service::TaskService;
use tower::Service as _;

pub const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

/// Test context containing all necessary resources
pub struct TestContext {
    pub app: axum::Router,
    pub repo: Arc<InMemoryTaskRepository>,
    pub kv: Arc<InMemoryKeyValueStore>,
    pub clock: FixedClock,
    pub credentials: CredentialService,
}

impl TestContext {
    /// Router over empty stores, clock at 2026-01-01 12:00 UTC
    pub fn new() -> Self {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap());
        let shared_clock = Arc::new(clock.clone());
        let repo = Arc::new(InMemoryTaskRepository::new());
        let kv = Arc::new(InMemoryKeyValueStore::with_clock(shared_clock.clone()));

        let credential_config = CredentialConfig::new(SECRET).unwrap();
        let credentials = CredentialService::new(
            kv.clone(),
            repo.clone(),
            shared_clock.clone(),
            credential_config.clone(),
        );
        let config = Config {
            api: ApiConfig::default(),
            database: DatabaseConfig::default(),
            credentials: credential_config,
        };

        let state = AppState::new(
            TaskService::new(repo.clone(), shared_clock),
            credentials.clone(),
            config,
        );

        TestContext {
            app: build_router(state),
            repo,
            kv,
            clock,
            credentials,
        }
    }

    /// Issues a code through the credential service and logs in over HTTP
    pub async fn login(&mut self, user_id: i64) -> TokenPair {
        let code = self.credentials.request_code(user_id).await.unwrap();
        let (status, body) = self
            .send(
                "POST",
                "/v1/auth/login",
                None,
                Some(serde_json::json!({ "user_id": user_id, "code": code })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        serde_json::from_value(body).unwrap()
    }

    /// Sends a request and returns the status with the JSON body
    /// (`Value::Null` when the body is empty)
    pub async fn send(
        &mut self,
        method: &str,
        uri: &str,
        bearer: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.call(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        (status, json)
    }
}
