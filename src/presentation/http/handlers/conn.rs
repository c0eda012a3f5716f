//! Connection Handlers
//!
//! Direct messages between users.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, warn};

use super::user::parse_id;
use crate::application::dto::{ConversationQuery, MessageResponse, SendMessageRequest};
use crate::application::services::{SendMessageDto, SendMessageFailure};
use crate::shared::error::{AppError, ErrorResponse};
use crate::shared::validation::validate;
use crate::startup::AppState;

/// POST /api/conn/send
pub async fn send_message(
    State(state): State<AppState>,
    Json(body): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), Response> {
    validate(&body).map_err(IntoResponse::into_response)?;

    let message = state
        .conns
        .send_message(SendMessageDto {
            sender_id: body.sender_id,
            recipient_id: body.recipient_id,
            text: body.text,
        })
        .await
        .map_err(IntoResponse::into_response)?;

    Ok((StatusCode::CREATED, Json(MessageResponse::from(message))))
}

/// GET /api/conn/{user_id}/messages?peer_id=..&limit=..
pub async fn conversation(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<ConversationQuery>,
) -> Result<Json<Vec<MessageResponse>>, AppError> {
    let user_id = parse_id(&user_id, "user ID")?;

    let messages = state
        .conns
        .conversation(user_id, query.peer_id, query.limit)
        .await?;

    Ok(Json(messages.into_iter().map(MessageResponse::from).collect()))
}

/// The client gets the failure's own status and message; the underlying
/// error only goes to the log.
impl IntoResponse for SendMessageFailure {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(error = %self.source, "{}", self.message);
        } else {
            warn!(error = %self.source, "{}", self.message);
        }

        (
            self.status,
            Json(ErrorResponse::new(self.status, self.message)),
        )
            .into_response()
    }
}
