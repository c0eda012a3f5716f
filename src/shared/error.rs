//! Application Error Types
//!
//! Centralized error handling with Axum integration.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    #[error("Unique violation: {0}")]
    UniqueViolation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    /// Classify a raw sqlx error, lifting constraint violations into their
    /// own variants so usecases can react to them.
    pub fn from_db(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_foreign_key_violation() {
                return AppError::ForeignKeyViolation(db.message().to_string());
            }
            if db.is_unique_violation() {
                return AppError::UniqueViolation(db.message().to_string());
            }
        }
        AppError::Database(err)
    }

    /// HTTP status this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_)
            | AppError::Validation(_)
            | AppError::ForeignKeyViolation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) | AppError::UniqueViolation(_) => StatusCode::CONFLICT,
            AppError::Internal(_)
            | AppError::Database(_)
            | AppError::Redis(_)
            | AppError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code: status.as_u16(),
            message: message.into(),
        }
    }
}

/// Field-level validation error
#[derive(Debug, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            AppError::NotFound(msg)
            | AppError::BadRequest(msg)
            | AppError::Conflict(msg)
            | AppError::Validation(msg) => msg.clone(),
            AppError::ForeignKeyViolation(_) => "Referenced record does not exist".into(),
            AppError::UniqueViolation(_) => "Record already exists".into(),
            e => {
                tracing::error!(error = %e, "Internal error");
                "Internal server error".into()
            }
        };

        (status, Json(ErrorResponse::new(status, message))).into_response()
    }
}
