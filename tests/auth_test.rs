//! Integration tests for signup, login and session cookies.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use tuiter::auth::{hash_password, verify_password};
use tuiter::config::{Config, Environment};
use tuiter::db::{get_all_users, Database};
use tuiter::web::{create_app, AppState};

async fn setup_app() -> (Router, Database, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.sqlite");
    let db = Database::new(&db_path)
        .await
        .expect("Failed to create database");

    let config = Config {
        database_path: db_path,
        web_host: "127.0.0.1".to_string(),
        web_port: 0,
        cors_origin: "http://localhost:3000".to_string(),
        body_limit_bytes: 1024 * 1024,
        environment: Environment::Development,
        session_cleanup_interval: Duration::from_secs(3600),
    };
    let app = create_app(AppState {
        db: db.clone(),
        config: Arc::new(config),
    })
    .expect("Failed to build app");

    (app, db, temp_dir)
}

/// Send a request, returning the status, headers and JSON body (`Null` if not JSON).
async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, HeaderMap, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, json)
}

/// The `name=value` part of the response's session cookie.
fn session_cookie(headers: &HeaderMap) -> Option<String> {
    let set_cookie = headers.get(header::SET_COOKIE)?.to_str().ok()?;
    let pair = set_cookie.split(';').next()?.trim();
    pair.starts_with("session=").then(|| pair.to_string())
}

fn credentials(username: &str, password: &str) -> Value {
    json!({ "username": username, "password": password })
}

#[test]
fn test_password_hash_round_trip() {
    let hash = hash_password("correct horse").expect("Failed to hash");
    assert_ne!(hash, "correct horse");
    assert!(verify_password("correct horse", &hash).unwrap());
    assert!(!verify_password("battery staple", &hash).unwrap());
}

#[tokio::test]
async fn test_signup_sets_cookie_and_hides_password() {
    let (app, _db, _temp_dir) = setup_app().await;

    let (status, headers, body) = send(
        &app,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(json!({
            "username": "alice",
            "password": "secret",
            "email": "alice@example.com",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["accountType"], "PERSONAL");
    assert!(body.get("password").is_none());
    assert!(body.get("passwordHash").is_none());

    let set_cookie = headers
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("Missing session cookie");
    assert!(set_cookie.starts_with("session="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(!set_cookie.contains("Secure"));
}

#[tokio::test]
async fn test_duplicate_signup_is_forbidden() {
    let (app, db, _temp_dir) = setup_app().await;

    let (first, _, _) = send(
        &app,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(credentials("alice", "secret")),
    )
    .await;
    assert_eq!(first, StatusCode::OK);

    let (second, headers, _) = send(
        &app,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(credentials("alice", "different")),
    )
    .await;
    assert_eq!(second, StatusCode::FORBIDDEN);
    assert!(session_cookie(&headers).is_none());
    assert_eq!(get_all_users(db.pool()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_login_checks_password() {
    let (app, _db, _temp_dir) = setup_app().await;
    send(
        &app,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(credentials("alice", "secret")),
    )
    .await;

    let (status, headers, _) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(credentials("alice", "wrong")),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(session_cookie(&headers).is_none());

    let (status, _, _) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(credentials("nobody", "secret")),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, headers, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(credentials("alice", "secret")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert!(session_cookie(&headers).is_some());
}

#[tokio::test]
async fn test_profile_requires_session() {
    let (app, _db, _temp_dir) = setup_app().await;
    let (_, headers, _) = send(
        &app,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(credentials("alice", "secret")),
    )
    .await;
    let cookie = session_cookie(&headers).expect("Missing session cookie");

    let (status, _, body) = send(&app, Method::POST, "/api/auth/profile", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");

    let (status, _, _) = send(&app, Method::POST, "/api/auth/profile", None, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, _) = send(
        &app,
        Method::POST,
        "/api/auth/profile",
        Some("session=not-a-real-token"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_logout_ends_session() {
    let (app, _db, _temp_dir) = setup_app().await;
    let (_, headers, _) = send(
        &app,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(credentials("alice", "secret")),
    )
    .await;
    let cookie = session_cookie(&headers).expect("Missing session cookie");

    let (status, headers, _) = send(&app, Method::POST, "/api/auth/logout", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    let cleared = headers
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("Logout should clear the cookie");
    assert!(cleared.contains("Max-Age=0"));

    let (status, _, _) = send(&app, Method::POST, "/api/auth/profile", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_me_resolves_to_session_user() {
    let (app, _db, _temp_dir) = setup_app().await;

    let (status, _, _) = send(&app, Method::GET, "/api/users/me/tuits", None, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, headers, _) = send(
        &app,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(credentials("alice", "secret")),
    )
    .await;
    let cookie = session_cookie(&headers).expect("Missing session cookie");

    let (status, _, tuit) = send(
        &app,
        Method::POST,
        "/api/users/me/tuits",
        Some(&cookie),
        Some(json!({ "tuit": "hello from me" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tuit["postedBy"]["username"], "alice");
    assert_eq!(tuit["postedByMe"], true);

    let (status, _, tuits) = send(&app, Method::GET, "/api/users/my/tuits", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tuits.as_array().map(Vec::len), Some(1));
}
