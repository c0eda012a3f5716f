//! Response DTOs
//!
//! Data structures for API response bodies. Snowflake ids are rendered as
//! strings so JavaScript clients keep full precision.

use serde::{Deserialize, Serialize};

use crate::application::services::{MessageDto, UserDto};

/// User response
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub login: String,
    pub name: String,
    pub created_at: String,
}

impl From<UserDto> for UserResponse {
    fn from(dto: UserDto) -> Self {
        Self {
            id: dto.id.to_string(),
            login: dto.login,
            name: dto.name,
            created_at: dto.created_at.to_rfc3339(),
        }
    }
}

/// Message response
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub id: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub text: String,
    pub created_at: String,
}

impl From<MessageDto> for MessageResponse {
    fn from(dto: MessageDto) -> Self {
        Self {
            id: dto.id.to_string(),
            sender_id: dto.sender_id.to_string(),
            recipient_id: dto.recipient_id.to_string(),
            text: dto.text,
            created_at: dto.created_at.to_rfc3339(),
        }
    }
}
