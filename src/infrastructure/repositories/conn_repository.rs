//! Connection Repository Implementation
//!
//! PostgreSQL storage for direct messages.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{ConnRepository, Message};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: i64,
    sender_id: i64,
    recipient_id: i64,
    text: String,
    created_at: DateTime<Utc>,
}

impl MessageRow {
    fn into_message(self) -> Message {
        Message {
            id: self.id,
            sender_id: self.sender_id,
            recipient_id: self.recipient_id,
            text: self.text,
            created_at: self.created_at,
        }
    }
}

/// PostgreSQL message repository.
#[derive(Clone)]
pub struct PgConnRepository {
    pool: PgPool,
}

impl PgConnRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConnRepository for PgConnRepository {
    /// Unknown sender or recipient surfaces as `AppError::ForeignKeyViolation`.
    async fn send_message(&self, message: &Message) -> Result<Message, AppError> {
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            INSERT INTO messages (id, sender_id, recipient_id, text, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, sender_id, recipient_id, text, created_at
            "#,
        )
        .bind(message.id)
        .bind(message.sender_id)
        .bind(message.recipient_id)
        .bind(&message.text)
        .bind(message.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from_db)?;

        Ok(row.into_message())
    }

    async fn conversation(
        &self,
        user_id: i64,
        peer_id: i64,
        limit: i64,
    ) -> Result<Vec<Message>, AppError> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, sender_id, recipient_id, text, created_at
            FROM messages
            WHERE (sender_id = $1 AND recipient_id = $2)
               OR (sender_id = $2 AND recipient_id = $1)
            ORDER BY id DESC
            LIMIT $3
            "#,
        )
        .bind(user_id)
        .bind(peer_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(MessageRow::into_message).collect())
    }
}
