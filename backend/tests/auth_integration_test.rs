//! Integration tests for authentication endpoints

mod common;

use axum::http::StatusCode;
use items_api_backend::auth::TokenService;
use serde_json::json;

#[tokio::test]
#[ignore = "requires database"]
async fn test_register_success() {
    let app = common::TestApp::new().await;

    let username = common::unique_username();
    let body = json!({
        "username": username,
        "password": "SecurePassword123!",
        "email": format!("{}@example.com", username),
    });

    let (status, response) = app.post("/api/v1/auth/register", &body.to_string()).await;
    assert_eq!(status, StatusCode::CREATED);

    let response: serde_json::Value = serde_json::from_str(&response).unwrap();
    assert_eq!(response["message"], "User registered successfully");
    assert_eq!(response["user"]["username"], username.as_str());
    assert!(response["user"].get("password_hash").is_none());

    // The token identifies the new user
    let tokens = TokenService::initialize(Some(common::TEST_SECRET)).unwrap();
    let identity = tokens
        .validate(response["token"].as_str().unwrap())
        .unwrap();
    assert_eq!(identity.username, username);
    assert_eq!(Some(identity.user_id), response["user"]["id"].as_i64());
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_register_duplicate_username() {
    let app = common::TestApp::new().await;

    let username = common::unique_username();
    let body = json!({
        "username": username,
        "password": "SecurePassword123!",
        "email": format!("{}@example.com", username),
    });

    let (status, _) = app.post("/api/v1/auth/register", &body.to_string()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app.post("/api/v1/auth/register", &body.to_string()).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_invalid_email() {
    // Rejected before storage, so no database is needed
    let app = common::TestApp::without_database();

    let body = json!({
        "username": "someone",
        "password": "SecurePassword123!",
        "email": "not-an-email",
    });

    let (status, response) = app.post("/api/v1/auth/register", &body.to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response.contains("email"));
}

#[tokio::test]
async fn test_register_weak_password() {
    let app = common::TestApp::without_database();

    let body = json!({
        "username": "someone",
        "password": "123",
        "email": "someone@example.com",
    });

    let (status, _) = app.post("/api/v1/auth/register", &body.to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_login_success() {
    let app = common::TestApp::new().await;
    let (_, user) = app.register_user().await;

    let body = json!({
        "username": user["username"],
        "password": "SecurePassword123!",
    });
    let (status, response) = app.post("/api/v1/auth/login", &body.to_string()).await;
    assert_eq!(status, StatusCode::OK);

    let response: serde_json::Value = serde_json::from_str(&response).unwrap();
    assert_eq!(response["message"], "Login successful");
    assert_eq!(response["user"]["id"], user["id"]);
    assert!(!response["token"].as_str().unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_login_failures_are_indistinguishable() {
    let app = common::TestApp::new().await;
    let (_, user) = app.register_user().await;

    let wrong_password = json!({
        "username": user["username"],
        "password": "WrongPassword123!",
    });
    let unknown_user = json!({
        "username": common::unique_username(),
        "password": "SecurePassword123!",
    });

    let (status_a, body_a) = app.post("/api/v1/auth/login", &wrong_password.to_string()).await;
    let (status_b, body_b) = app.post("/api/v1/auth/login", &unknown_user.to_string()).await;

    assert_eq!(status_a, StatusCode::UNAUTHORIZED);
    assert_eq!(status_b, StatusCode::UNAUTHORIZED);
    assert_eq!(body_a, body_b);
    assert!(body_a.contains("Invalid username or password"));
}
