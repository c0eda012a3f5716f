//! Message entity and repository trait.
//!
//! Maps to the `messages` table. Both participants reference `users(id)`,
//! so sending to an unknown user fails with a foreign-key violation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// A direct message between two users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub sender_id: i64,
    pub recipient_id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Relational access to the connection (direct message) tables.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConnRepository: Send + Sync {
    /// Persist a message.
    async fn send_message(&self, message: &Message) -> Result<Message, AppError>;

    /// Messages exchanged between two users, newest first.
    async fn conversation(
        &self,
        user_id: i64,
        peer_id: i64,
        limit: i64,
    ) -> Result<Vec<Message>, AppError>;
}
