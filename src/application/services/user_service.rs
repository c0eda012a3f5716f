//! User Service
//!
//! Creates users and serves profile lookups through a read-through cache.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::domain::{User, UserCacheRepository, UserRepository};
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;

/// User service trait
#[async_trait]
pub trait UserService: Send + Sync {
    /// Register a new user
    async fn create_user(&self, request: CreateUserDto) -> Result<UserDto, UserError>;

    /// Get user by ID
    async fn get_user(&self, user_id: i64) -> Result<UserDto, UserError>;
}

/// Create user request
#[derive(Debug, Clone)]
pub struct CreateUserDto {
    pub login: String,
    pub name: String,
}

/// User data transfer object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDto {
    pub id: i64,
    pub login: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            login: user.login,
            name: user.name,
            created_at: user.created_at,
        }
    }
}

/// User service errors
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("User {0} not found")]
    NotFound(i64),

    #[error("Login {0} is already taken")]
    LoginTaken(String),

    #[error("Internal error: {0}")]
    Internal(#[from] AppError),
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) => AppError::NotFound(err.to_string()),
            UserError::LoginTaken(_) => AppError::Conflict(err.to_string()),
            UserError::Internal(e) => e,
        }
    }
}

/// UserService implementation
pub struct UserServiceImpl<R, C>
where
    R: UserRepository,
    C: UserCacheRepository,
{
    user_repo: Arc<R>,
    user_cache: Arc<C>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<R, C> UserServiceImpl<R, C>
where
    R: UserRepository,
    C: UserCacheRepository,
{
    pub fn new(user_repo: Arc<R>, user_cache: Arc<C>, id_generator: Arc<SnowflakeGenerator>) -> Self {
        Self {
            user_repo,
            user_cache,
            id_generator,
        }
    }

    /// Cache failures degrade to a miss; Postgres stays the source of truth.
    async fn cached(&self, user_id: i64) -> Option<User> {
        match self.user_cache.get_user(user_id).await {
            Ok(user) => user,
            Err(e) => {
                warn!(user_id, error = %e, "User cache read failed");
                None
            }
        }
    }
}

#[async_trait]
impl<R, C> UserService for UserServiceImpl<R, C>
where
    R: UserRepository + 'static,
    C: UserCacheRepository + 'static,
{
    async fn create_user(&self, request: CreateUserDto) -> Result<UserDto, UserError> {
        if self.user_repo.find_by_login(&request.login).await?.is_some() {
            return Err(UserError::LoginTaken(request.login));
        }

        let user = User {
            id: self.id_generator.generate(),
            login: request.login,
            name: request.name,
            created_at: Utc::now(),
        };

        // Two concurrent registrations can both pass the lookup above
        let created = self.user_repo.create(&user).await.map_err(|e| match e {
            AppError::UniqueViolation(_) => UserError::LoginTaken(user.login.clone()),
            e => UserError::Internal(e),
        })?;

        debug!(user_id = created.id, "User created");
        Ok(UserDto::from(created))
    }

    async fn get_user(&self, user_id: i64) -> Result<UserDto, UserError> {
        if let Some(user) = self.cached(user_id).await {
            debug!(user_id, "User cache hit");
            return Ok(UserDto::from(user));
        }

        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(UserError::NotFound(user_id))?;

        if let Err(e) = self.user_cache.set_user(&user).await {
            warn!(user_id, error = %e, "User cache write failed");
        }

        Ok(UserDto::from(user))
    }
}
