//! User API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use chat_core_api::application::dto::UserResponse;
use chat_core_api::shared::error::ErrorResponse;

use crate::common::{json_body, unique_login, TestApp};

#[tokio::test]
async fn test_create_then_get_user() {
    let app = TestApp::new();
    let login = unique_login();

    let created: UserResponse = json_body(
        app.post_json("/api/user", json!({ "login": login, "name": "Ninja" }))
            .await,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(created.login, login);

    let fetched: UserResponse = json_body(
        app.get(&format!("/api/user/{}", created.id)).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.name, "Ninja");
}

#[tokio::test]
async fn test_duplicate_login_conflicts() {
    let app = TestApp::new();
    app.store.insert_user(1, "taken");

    let error: ErrorResponse = json_body(
        app.post_json("/api/user", json!({ "login": "taken", "name": "Other" }))
            .await,
        StatusCode::CONFLICT,
    )
    .await;

    assert_eq!(error.code, 409);
    assert_eq!(error.message, "Login taken is already taken");
}

#[tokio::test]
async fn test_invalid_login_is_rejected() {
    let app = TestApp::new();

    let error: ErrorResponse = json_body(
        app.post_json("/api/user", json!({ "login": "x", "name": "Short" }))
            .await,
        StatusCode::BAD_REQUEST,
    )
    .await;

    assert_eq!(error.message, "login: Login must be 2-64 characters");
}

#[tokio::test]
async fn test_get_missing_user() {
    let app = TestApp::new();

    let error: ErrorResponse =
        json_body(app.get("/api/user/404").await, StatusCode::NOT_FOUND).await;

    assert_eq!(
        error,
        ErrorResponse {
            code: 404,
            message: "User 404 not found".into(),
        }
    );
}

#[tokio::test]
async fn test_get_user_with_malformed_id() {
    let app = TestApp::new();

    let error: ErrorResponse =
        json_body(app.get("/api/user/abc").await, StatusCode::BAD_REQUEST).await;

    assert_eq!(error.message, "Invalid user ID");
}
