//! Integration tests: health and the signup/signin/verify flow over HTTP.
//!
//! Run with `cargo test`. The in-memory store is used by default. To also
//! exercise PostgreSQL, set `TEST_DATABASE_URL`.

use std::sync::Arc;

use authflow::auth::{HashCost, PasswordHasher, TokenIssuer, TokenVerifier};
use authflow::db::{CredentialStore, MemoryCredentialStore, PgCredentialStore};
use authflow::{create_app, AppState, AuthService};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Duration;
use serde_json::{json, Value};
use tower::util::ServiceExt;

const SECRET: &str = "test-jwt-secret-min-32-chars!!";

fn test_app(store: Arc<dyn CredentialStore>) -> (Router, TokenIssuer) {
    let hasher = PasswordHasher::new(HashCost {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    })
    .unwrap();
    let issuer = TokenIssuer::new(SECRET, Duration::hours(24));
    let service = AuthService::new(store, hasher, issuer.clone(), TokenVerifier::new(SECRET));
    (create_app(AppState::new(service)), issuer)
}

fn memory_app() -> (Router, TokenIssuer) {
    test_app(Arc::new(MemoryCredentialStore::new()))
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn verify_req(token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri("/api/auth/verify");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

async fn signup(app: &Router, name: &str, email: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        post_json(
            "/api/auth/signup",
            json!({ "name": name, "email": email, "password": password }),
        ),
    )
    .await
}

async fn signin(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        post_json(
            "/api/auth/signin",
            json!({ "email": email, "password": password }),
        ),
    )
    .await
}

#[tokio::test]
async fn health_returns_ok() {
    let (app, _) = memory_app();
    let req = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.get("status").and_then(|v| v.as_str()), Some("ok"));
}

#[tokio::test]
async fn alice_signup_signin_verify() {
    let (app, _) = memory_app();

    let (status, json) = signup(&app, "Alice", "alice@example.com", "secret1").await;
    assert_eq!(status, StatusCode::CREATED, "signup should succeed: {}", json);
    assert_eq!(json["status"], "success");
    assert_eq!(json["message"], "User registered successfully");
    assert_eq!(json["user"]["name"], "Alice");
    assert_eq!(json["user"]["email"], "alice@example.com");
    assert!(json["user"]["id"].as_str().is_some());
    assert!(json["user"]["createdAt"].as_str().is_some());
    assert!(json["user"].get("password").is_none());
    assert!(json["user"].get("passwordHash").is_none());
    let signup_token = json["token"].as_str().unwrap().to_string();

    let (status, json) = signin(&app, "ALICE@Example.com", "secret1").await;
    assert_eq!(status, StatusCode::OK, "signin should succeed: {}", json);
    assert_eq!(json["message"], "Login successful");
    assert!(json["token"].as_str().is_some());

    let (status, json) = signin(&app, "alice@example.com", "wrong").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["status"], "error");
    assert_eq!(json["message"], "Invalid email or password");

    let (status, json) = send(&app, verify_req(Some(&signup_token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["valid"], true);
    assert_eq!(json["token"], signup_token.as_str());
    assert_eq!(json["user"]["name"], "Alice");
    assert_eq!(json["user"]["email"], "alice@example.com");
}

#[tokio::test]
async fn unknown_email_matches_wrong_password() {
    let (app, _) = memory_app();
    signup(&app, "Alice", "alice@example.com", "secret1").await;

    let (wrong_status, wrong) = signin(&app, "alice@example.com", "nope-nope").await;
    let (unknown_status, unknown) = signin(&app, "nobody@example.com", "secret1").await;
    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong, unknown);
}

#[tokio::test]
async fn duplicate_signup_is_bad_request() {
    let (app, _) = memory_app();
    let (status, _) = signup(&app, "Alice", "alice@example.com", "secret1").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, json) = signup(&app, "Alice Two", "  Alice@Example.COM ", "secret2").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "User with this email already exists");
}

#[tokio::test]
async fn signup_validation_errors_are_listed() {
    let (app, _) = memory_app();
    let (status, json) = signup(&app, "A", "not-an-email", "123").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], "error");
    assert_eq!(json["message"], "Validation failed");
    let fields: Vec<&str> = json["errors"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["field"].as_str())
        .collect();
    assert_eq!(fields, vec!["email", "name", "password"]);
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let (app, _) = memory_app();
    let req = Request::builder()
        .method("POST")
        .uri("/api/auth/signup")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": \"Alice\""))
        .unwrap();
    let (status, json) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["errors"][0]["field"], "body");

    let (status, _) = send(
        &app,
        post_json("/api/auth/signin", json!({ "email": "alice@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn verify_requires_bearer_token() {
    let (app, _) = memory_app();
    let (status, json) = send(&app, verify_req(None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "No token provided, authorization denied");

    let req = Request::builder()
        .uri("/api/auth/verify")
        .header(header::AUTHORIZATION, "Basic YWxpY2U6c2VjcmV0")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn tampered_and_expired_tokens_are_unauthorized() {
    let (app, issuer) = memory_app();
    let (_, json) = signup(&app, "Alice", "alice@example.com", "secret1").await;
    let token = json["token"].as_str().unwrap().to_string();
    let user_id: uuid::Uuid = json["user"]["id"].as_str().unwrap().parse().unwrap();

    let mut tampered = token.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == 'Q' { 'R' } else { 'Q' });
    let (status, json) = send(&app, verify_req(Some(&tampered))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["status"], "error");
    assert!(json.get("user").is_none());

    let expired = issuer.issue_with_ttl(user_id, Duration::zero()).unwrap();
    let (status, _) = send(&app, verify_req(Some(&expired))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, verify_req(Some("garbage"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn postgres_register_and_login() {
    let database_url = match std::env::var("TEST_DATABASE_URL") {
        Ok(u) => u,
        Err(_) => {
            eprintln!("Skip integration test: set TEST_DATABASE_URL");
            return;
        }
    };
    let store = match PgCredentialStore::connect(&database_url).await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Skip integration test: {}", e);
            return;
        }
    };
    store.migrate().await.unwrap();
    let (app, _) = test_app(Arc::new(store));

    let email = format!(
        "test-{}@example.com",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_millis()
    );
    let (status, json) = signup(&app, "Pg User", &email, "password123").await;
    assert_eq!(status, StatusCode::CREATED, "register should succeed: {}", json);

    let (status, _) = signup(&app, "Pg User", &email.to_uppercase(), "password123").await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "duplicate should be rejected");

    let (status, json) = signin(&app, &email, "password123").await;
    assert_eq!(status, StatusCode::OK, "login should succeed");
    let token = json["token"].as_str().unwrap().to_string();

    let (status, json) = send(&app, verify_req(Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["user"]["email"], email.as_str());
}
