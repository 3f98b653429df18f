/// Integration tests for the Task Tracker API
///
/// These drive the complete router (middleware, extractors, error mapping)
/// against in-memory backends:
/// - Health check
/// - One-time-code login, refresh rotation, logout
/// - Task listing, creation and deletion behind the access-token gate

mod common;

use axum::http::StatusCode;
use chrono::Duration;
use common::TestContext;
use serde_json::json;

const USER: i64 = 7;

#[tokio::test]
async fn test_health_check() {
    let mut ctx = TestContext::new();

    let (status, body) = ctx.send("GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());
    assert!(body.get("database").is_none());
}

#[tokio::test]
async fn test_task_routes_require_token() {
    let mut ctx = TestContext::new();

    let (status, body) = ctx.send("GET", "/v1/tasks", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, _) = ctx.send("GET", "/v1/tasks", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_with_wrong_code() {
    let mut ctx = TestContext::new();
    let code = ctx.credentials.request_code(USER).await.unwrap();
    let wrong = if code == "000000" { "111111" } else { "000000" };

    let (status, body) = ctx
        .send(
            "POST",
            "/v1/auth/login",
            None,
            Some(json!({ "user_id": USER, "code": wrong })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.get("access_token").is_none());

    // The real code still works
    let (status, _) = ctx
        .send(
            "POST",
            "/v1/auth/login",
            None,
            Some(json!({ "user_id": USER, "code": code })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_request_validation() {
    let mut ctx = TestContext::new();

    let (status, body) = ctx
        .send(
            "POST",
            "/v1/auth/login",
            None,
            Some(json!({ "user_id": USER, "code": "12" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "code");

    let (status, body) = ctx
        .send("POST", "/v1/auth/login", None, Some(json!({ "code": "123456" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_create_and_list_tasks() {
    let mut ctx = TestContext::new();
    let tokens = ctx.login(USER).await;

    let (status, body) = ctx
        .send(
            "POST",
            "/v1/tasks",
            Some(&tokens.access_token),
            Some(json!({ "title": "Buy milk", "deadline": "2.1.2026 15:04" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "status": "created" }));

    let (status, body) = ctx
        .send("GET", "/v1/tasks", Some(&tokens.access_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let tasks = body.as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["title"], "Buy milk");
    assert_eq!(tasks[0]["deadline_display"], "02.01.2026 15:04");

    // Owned by the authenticated user
    assert_eq!(ctx.repo.all_tasks()[0].owner_id, USER);
}

#[tokio::test]
async fn test_create_task_rejects_past_deadline() {
    let mut ctx = TestContext::new();
    let tokens = ctx.login(USER).await;

    let (status, body) = ctx
        .send(
            "POST",
            "/v1/tasks",
            Some(&tokens.access_token),
            Some(json!({ "title": "Old", "deadline": "1.1.2020 10:00" })),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "The deadline must be in the future");
    assert!(ctx.repo.all_tasks().is_empty());
}

#[tokio::test]
async fn test_create_task_storage_failure_is_opaque() {
    let mut ctx = TestContext::new();
    let tokens = ctx.login(USER).await;
    ctx.repo.set_unavailable(true);

    let (status, body) = ctx
        .send(
            "POST",
            "/v1/tasks",
            Some(&tokens.access_token),
            Some(json!({ "title": "Buy milk", "deadline": "2.1.2026 15:04" })),
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "An internal error occurred");
}

#[tokio::test]
async fn test_delete_task() {
    let mut ctx = TestContext::new();
    let tokens = ctx.login(USER).await;
    ctx.send(
        "POST",
        "/v1/tasks",
        Some(&tokens.access_token),
        Some(json!({ "title": "Buy milk", "deadline": "2.1.2026 15:04" })),
    )
    .await;
    let task_id = ctx.repo.all_tasks()[0].id;

    let (status, _) = ctx
        .send(
            "DELETE",
            &format!("/v1/tasks/{}", task_id),
            Some(&tokens.access_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(ctx.repo.all_tasks().is_empty());
}

#[tokio::test]
async fn test_delete_someone_elses_task() {
    let mut ctx = TestContext::new();
    let owner = ctx.login(USER).await;
    let other = ctx.login(USER + 1).await;
    ctx.send(
        "POST",
        "/v1/tasks",
        Some(&owner.access_token),
        Some(json!({ "title": "Buy milk", "deadline": "2.1.2026 15:04" })),
    )
    .await;
    let task_id = ctx.repo.all_tasks()[0].id;

    let (status, _) = ctx
        .send(
            "DELETE",
            &format!("/v1/tasks/{}", task_id),
            Some(&other.access_token),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(ctx.repo.all_tasks().len(), 1);
}

#[tokio::test]
async fn test_delete_with_bad_id() {
    let mut ctx = TestContext::new();
    let tokens = ctx.login(USER).await;

    let (status, _) = ctx
        .send("DELETE", "/v1/tasks/abc", Some(&tokens.access_token), None)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_refresh_rotation() {
    let mut ctx = TestContext::new();
    let tokens = ctx.login(USER).await;
    let body = json!({ "refresh_token": tokens.refresh_token });

    let (status, rotated) = ctx
        .send("POST", "/v1/auth/refresh", None, Some(body.clone()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(rotated["refresh_token"], json!(tokens.refresh_token));

    let (status, _) = ctx
        .send("POST", "/v1/auth/refresh", None, Some(body))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let new_access = rotated["access_token"].as_str().unwrap().to_string();
    let (status, _) = ctx.send("GET", "/v1/tasks", Some(&new_access), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_logout_revokes_access_token() {
    let mut ctx = TestContext::new();
    let tokens = ctx.login(USER).await;

    let (status, _) = ctx
        .send(
            "POST",
            "/v1/auth/logout",
            Some(&tokens.access_token),
            Some(json!({ "refresh_token": tokens.refresh_token })),
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = ctx
        .send("GET", "/v1/tasks", Some(&tokens.access_token), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token has been revoked");

    let (status, _) = ctx
        .send(
            "POST",
            "/v1/auth/refresh",
            None,
            Some(json!({ "refresh_token": tokens.refresh_token })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert_eq!(
        ctx.kv.ttl(&format!("blacklist:{}", tokens.access_token)),
        Some(Duration::minutes(15))
    );
}

#[tokio::test]
async fn test_access_token_expires() {
    let mut ctx = TestContext::new();
    let tokens = ctx.login(USER).await;

    ctx.clock.advance(Duration::minutes(16));

    let (status, body) = ctx
        .send("GET", "/v1/tasks", Some(&tokens.access_token), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token has expired");
}
