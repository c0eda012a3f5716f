//! Connection API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use chat_core_api::application::dto::MessageResponse;
use chat_core_api::shared::error::ErrorResponse;

use crate::common::{json_body, TestApp};

#[tokio::test]
async fn test_send_message_between_users() {
    let app = TestApp::new();
    app.store.insert_user(1, "alice");
    app.store.insert_user(2, "bob");

    let message: MessageResponse = json_body(
        app.post_json(
            "/api/conn/send",
            json!({ "sender_id": 1, "recipient_id": 2, "text": "hi bob" }),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;

    assert_eq!(message.sender_id, "1");
    assert_eq!(message.recipient_id, "2");
    assert_eq!(message.text, "hi bob");
    assert_eq!(app.store.message_count(), 1);
}

#[tokio::test]
async fn test_send_to_unknown_recipient_names_the_id() {
    let app = TestApp::new();
    app.store.insert_user(1, "alice");

    let error: ErrorResponse = json_body(
        app.post_json(
            "/api/conn/send",
            json!({ "sender_id": 1, "recipient_id": 999, "text": "anyone?" }),
        )
        .await,
        StatusCode::BAD_REQUEST,
    )
    .await;

    assert_eq!(
        error,
        ErrorResponse {
            code: 400,
            message: "user with id 999 doesn't exist".into(),
        }
    );
    assert_eq!(app.store.message_count(), 0);
}

#[tokio::test]
async fn test_unknown_recipient_keeps_underlying_error() {
    use chat_core_api::application::services::SendMessageDto;
    use chat_core_api::shared::error::AppError;

    let app = TestApp::new();
    app.store.insert_user(1, "alice");

    let failure = app
        .deps
        .http
        .conns
        .send_message(SendMessageDto {
            sender_id: 1,
            recipient_id: 999,
            text: "anyone?".into(),
        })
        .await
        .unwrap_err();

    assert_eq!(failure.status, StatusCode::BAD_REQUEST);
    assert_eq!(failure.message, "user with id 999 doesn't exist");
    assert!(matches!(failure.source, AppError::ForeignKeyViolation(_)));
    assert!(std::error::Error::source(&failure).is_some());
}

#[tokio::test]
async fn test_empty_text_is_rejected() {
    let app = TestApp::new();

    let response = app
        .post_json(
            "/api/conn/send",
            json!({ "sender_id": 1, "recipient_id": 2, "text": "" }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_conversation_is_newest_first() {
    let app = TestApp::new();
    app.store.insert_user(1, "alice");
    app.store.insert_user(2, "bob");

    for (from, to, text) in [(1, 2, "first"), (2, 1, "second"), (1, 2, "third")] {
        let response = app
            .post_json(
                "/api/conn/send",
                json!({ "sender_id": from, "recipient_id": to, "text": text }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let messages: Vec<MessageResponse> = json_body(
        app.get("/api/conn/1/messages?peer_id=2&limit=2").await,
        StatusCode::OK,
    )
    .await;

    let texts: Vec<_> = messages.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["third", "second"]);
}
