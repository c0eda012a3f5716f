//! Request DTOs
//!
//! Data structures for API request bodies.

use serde::Deserialize;
use validator::Validate;

/// Create user request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 2, max = 64, message = "Login must be 2-64 characters"))]
    pub login: String,

    #[validate(length(min = 1, max = 128, message = "Name must be 1-128 characters"))]
    pub name: String,
}

/// Send message request
#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    pub sender_id: i64,

    pub recipient_id: i64,

    #[validate(length(min = 1, max = 4000, message = "Text must be 1-4000 characters"))]
    pub text: String,
}

/// Conversation query parameters
#[derive(Debug, Deserialize)]
pub struct ConversationQuery {
    pub peer_id: i64,
    pub limit: Option<i64>,
}
