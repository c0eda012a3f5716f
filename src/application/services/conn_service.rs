//! Connection Service
//!
//! Direct messages between users. A failed send is answered with a
//! structured response for the caller while the low-level error travels
//! along for logging.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};

use crate::domain::{ConnRepository, Message};
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;

const DEFAULT_CONVERSATION_LIMIT: i64 = 50;
const MAX_CONVERSATION_LIMIT: i64 = 100;

/// Connection service trait
#[async_trait]
pub trait ConnService: Send + Sync {
    /// Send a direct message
    async fn send_message(&self, request: SendMessageDto) -> Result<MessageDto, SendMessageFailure>;

    /// Messages between `user_id` and `peer_id`, newest first
    async fn conversation(
        &self,
        user_id: i64,
        peer_id: i64,
        limit: Option<i64>,
    ) -> Result<Vec<MessageDto>, AppError>;
}

/// Send message request
#[derive(Debug, Clone)]
pub struct SendMessageDto {
    pub sender_id: i64,
    pub recipient_id: i64,
    pub text: String,
}

/// Message data transfer object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDto {
    pub id: i64,
    pub sender_id: i64,
    pub recipient_id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessageDto {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            sender_id: message.sender_id,
            recipient_id: message.recipient_id,
            text: message.text,
            created_at: message.created_at,
        }
    }
}

/// A send that did not go through.
///
/// `message` and `status` are meant for the client; `source` is the
/// underlying error and is only for logs.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct SendMessageFailure {
    pub message: String,
    pub status: StatusCode,
    #[source]
    pub source: AppError,
}

impl SendMessageFailure {
    fn unknown_user(recipient_id: i64, source: AppError) -> Self {
        Self {
            message: format!("user with id {} doesn't exist", recipient_id),
            status: StatusCode::BAD_REQUEST,
            source,
        }
    }

    fn internal(source: AppError) -> Self {
        Self {
            message: "failed to send message".into(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
            source,
        }
    }
}

/// ConnService implementation
pub struct ConnServiceImpl<R>
where
    R: ConnRepository,
{
    conn_repo: Arc<R>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<R> ConnServiceImpl<R>
where
    R: ConnRepository,
{
    pub fn new(conn_repo: Arc<R>, id_generator: Arc<SnowflakeGenerator>) -> Self {
        Self {
            conn_repo,
            id_generator,
        }
    }
}

#[async_trait]
impl<R> ConnService for ConnServiceImpl<R>
where
    R: ConnRepository + 'static,
{
    async fn send_message(&self, request: SendMessageDto) -> Result<MessageDto, SendMessageFailure> {
        let message = Message {
            id: self.id_generator.generate(),
            sender_id: request.sender_id,
            recipient_id: request.recipient_id,
            text: request.text,
            created_at: Utc::now(),
        };

        match self.conn_repo.send_message(&message).await {
            Ok(stored) => Ok(MessageDto::from(stored)),
            Err(e @ AppError::ForeignKeyViolation(_)) => {
                Err(SendMessageFailure::unknown_user(request.recipient_id, e))
            }
            Err(e) => Err(SendMessageFailure::internal(e)),
        }
    }

    async fn conversation(
        &self,
        user_id: i64,
        peer_id: i64,
        limit: Option<i64>,
    ) -> Result<Vec<MessageDto>, AppError> {
        let limit = limit
            .unwrap_or(DEFAULT_CONVERSATION_LIMIT)
            .clamp(1, MAX_CONVERSATION_LIMIT);

        let messages = self.conn_repo.conversation(user_id, peer_id, limit).await?;
        Ok(messages.into_iter().map(MessageDto::from).collect())
    }
}
