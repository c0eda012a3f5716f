//! User entity and repository traits.
//!
//! Maps to the `users` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// A chat participant.
///
/// Maps to the `users` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - login: VARCHAR(64) NOT NULL UNIQUE
/// - name: VARCHAR(128) NOT NULL
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Snowflake ID (primary key)
    pub id: i64,

    /// Unique login handle
    pub login: String,

    /// Human readable name
    pub name: String,

    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Relational access to users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. A taken login surfaces as `AppError::UniqueViolation`.
    async fn create(&self, user: &User) -> Result<User, AppError>;

    /// Find a user by their Snowflake ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    /// Find a user by login.
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, AppError>;
}

/// Cache-side access to users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserCacheRepository: Send + Sync {
    async fn get_user(&self, id: i64) -> Result<Option<User>, AppError>;

    async fn set_user(&self, user: &User) -> Result<(), AppError>;
}
