//! User Handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::{CreateUserRequest, UserResponse};
use crate::application::services::CreateUserDto;
use crate::shared::error::AppError;
use crate::shared::validation::validate;
use crate::startup::AppState;

/// POST /api/user
pub async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    validate(&body)?;

    let user = state
        .users
        .create_user(CreateUserDto {
            login: body.login,
            name: body.name,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// GET /api/user/{user_id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let user_id = parse_id(&user_id, "user ID")?;
    let user = state.users.get_user(user_id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Parse a snowflake from a path segment.
pub(crate) fn parse_id(raw: &str, what: &str) -> Result<i64, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid {}", what)))
}
