//! HTTP 계층 통합 테스트.
//!
//! 인증 미들웨어가 적용된 전체 라우터에 `oneshot`으로 요청을 보냅니다.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use identity_api::repository::{AccountStore, InMemoryAccountStore};
use identity_api::services::RegistrationMode;
use identity_api::{create_app_router, AppState, TokenAuthority};
use identity_notification::{LogDispatcher, MemoryLogSink, OperationKind};
use identity_permission::{
    HttpPermissionClient, PermissionAuthority, PermissionClientConfig, StandaloneAuthority,
};
use secrecy::SecretString;
use serde_json::{json, Value};
use tower::ServiceExt;

struct TestApp {
    router: Router,
    store: Arc<InMemoryAccountStore>,
    logs: Arc<MemoryLogSink>,
}

fn test_app(authority: Arc<dyn PermissionAuthority>, mode: RegistrationMode) -> TestApp {
    let store = Arc::new(InMemoryAccountStore::new());
    let logs = Arc::new(MemoryLogSink::new());
    let tokens = TokenAuthority::new(
        &SecretString::new("http-test-secret".to_string().into_boxed_str()),
        Duration::from_secs(86_400),
    )
    .unwrap();

    let state = Arc::new(AppState::new(
        store.clone(),
        authority,
        Arc::new(tokens),
        LogDispatcher::new().with_sink(logs.clone()),
        mode,
    ));

    TestApp {
        router: create_app_router(state),
        store,
        logs,
    }
}

fn standalone_app() -> TestApp {
    test_app(Arc::new(StandaloneAuthority::new()), RegistrationMode::Standalone)
}

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-forwarded-for", "203.0.113.7");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn register(router: &Router, username: &str) -> (StatusCode, Value) {
    send(
        router,
        Method::POST,
        "/user/register",
        None,
        Some(json!({ "username": username, "password": "secret1" })),
    )
    .await
}

async fn login(router: &Router, username: &str) -> String {
    let (status, body) = send(
        router,
        Method::POST,
        "/user/login",
        None,
        Some(json!({ "username": username, "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let app = standalone_app();

    let (status, body) = send(&app.router, Method::GET, "/user/users", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 401);
    assert!(body["data"].is_null());

    let (status, _) = send(
        &app.router,
        Method::GET,
        "/user/info/1",
        Some("not.a.token"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_is_public() {
    let app = standalone_app();

    let (status, _) = send(&app.router, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app.router, Method::GET, "/health/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["mode"], "standalone");
}

#[tokio::test]
async fn test_register_login_and_read_own_info() {
    let app = standalone_app();

    let (status, body) = register(&app.router, "alice").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 200);
    assert_eq!(body["message"], "회원가입 성공");
    assert_eq!(body["data"]["username"], "alice");
    assert!(body["data"].get("passwordHash").is_none());
    assert!(body["timestamp"].as_i64().unwrap() > 0);
    let user_id = body["data"]["userId"].as_i64().unwrap();

    let token = login(&app.router, "alice").await;

    let (status, body) = send(
        &app.router,
        Method::GET,
        &format!("/user/info/{}", user_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["userId"], user_id);

    let logs = app.logs.wait_for(3).await;
    let query = logs
        .iter()
        .find(|l| l.operation == OperationKind::UserQuery)
        .unwrap();
    assert_eq!(query.ip_address.as_deref(), Some("203.0.113.7"));
}

#[tokio::test]
async fn test_reading_other_account_is_forbidden() {
    let app = standalone_app();
    register(&app.router, "alice").await;
    register(&app.router, "bob").await;

    let token = login(&app.router, "alice").await;
    let (status, body) = send(&app.router, Method::GET, "/user/info/2", Some(&token), None).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 403);

    // 일반 사용자의 목록은 본인만 포함합니다
    let (status, body) = send(&app.router, Method::GET, "/user/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalElements"], 1);
    assert_eq!(body["data"]["content"][0]["username"], "alice");
}

#[tokio::test]
async fn test_validation_and_conflict_are_400() {
    let app = standalone_app();

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/user/register",
        None,
        Some(json!({ "username": "al", "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "사용자명은 3-50자여야 합니다");

    let (status, _) = send(
        &app.router,
        Method::POST,
        "/user/register",
        None,
        Some(json!({ "username": "alice", "password": "secret1", "phone": "12345" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    register(&app.router, "alice").await;
    let (status, body) = register(&app.router, "alice").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
    assert_eq!(app.store.len().await, 1);
}

#[tokio::test]
async fn test_wrong_password_login_is_401() {
    let app = standalone_app();
    register(&app.router, "alice").await;

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/user/login",
        None,
        Some(json!({ "username": "alice", "password": "wrongpass" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn test_update_and_reset_password() {
    let app = standalone_app();
    register(&app.router, "alice").await;
    let token = login(&app.router, "alice").await;

    let (status, body) = send(
        &app.router,
        Method::PUT,
        "/user/1",
        Some(&token),
        Some(json!({ "email": "alice@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "alice@example.com");

    let (status, _) = send(
        &app.router,
        Method::POST,
        "/user/reset-password",
        Some(&token),
        Some(json!({ "oldPassword": "secret1", "newPassword": "newpass1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app.router,
        Method::POST,
        "/user/login",
        None,
        Some(json!({ "username": "alice", "password": "newpass1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_distributed_register_compensates_on_rejected_binding() {
    let mut server = mockito::Server::new_async().await;
    let bind = server
        .mock("POST", "/permission/bind-default-role")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success":false,"message":"role table locked"}"#)
        .create_async()
        .await;

    let client = HttpPermissionClient::new(PermissionClientConfig::new(
        server.url(),
        Duration::from_secs(2),
    ))
    .unwrap();
    let app = test_app(Arc::new(client), RegistrationMode::Distributed);

    let (status, body) = register(&app.router, "bob").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], 500);
    assert!(body["data"].is_null());
    assert!(app.store.find_by_username("bob").await.unwrap().is_none());
    bind.assert_async().await;
}

#[tokio::test]
async fn test_failing_profile_lookup_degrades_to_self_service() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/permission/bind-default-role")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(r#"{"success":true,"roleCode":"USER"}"#)
        .expect(2)
        .create_async()
        .await;
    server
        .mock("GET", mockito::Matcher::Regex(r"^/permission/user/\d+$".to_string()))
        .with_status(503)
        .with_body("unavailable")
        .create_async()
        .await;

    let client = HttpPermissionClient::new(PermissionClientConfig::new(
        server.url(),
        Duration::from_secs(2),
    ))
    .unwrap();
    let app = test_app(Arc::new(client), RegistrationMode::Distributed);

    assert_eq!(register(&app.router, "alice").await.0, StatusCode::OK);
    assert_eq!(register(&app.router, "bob").await.0, StatusCode::OK);
    let token = login(&app.router, "alice").await;

    let (own, _) = send(&app.router, Method::GET, "/user/info/1", Some(&token), None).await;
    assert_eq!(own, StatusCode::OK);

    let (other, _) = send(&app.router, Method::GET, "/user/info/2", Some(&token), None).await;
    assert_eq!(other, StatusCode::FORBIDDEN);
}
