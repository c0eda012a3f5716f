//! Cache Service
//!
//! Generic cache trait and Redis implementation storing JSON values.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, instrument};

use crate::shared::error::AppError;

/// Generic cache trait for abstracting cache operations.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Retrieves a value by key. `Ok(None)` on a miss.
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>, AppError>;

    /// Stores a value with a time-to-live in seconds.
    async fn set_ex<T: Serialize + Sync + Send>(
        &self,
        key: &str,
        value: &T,
        seconds: u64,
    ) -> Result<(), AppError>;
}

/// Redis-backed cache implementation.
///
/// Uses a Redis ConnectionManager for automatic reconnection; cloning is cheap.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl Cache for RedisCache {
    #[instrument(skip(self), level = "debug")]
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>, AppError> {
        let mut conn = self.conn.clone();

        let result: Option<String> = conn.get(key).await?;

        match result {
            Some(data) => {
                debug!(key, "Cache hit");
                Ok(Some(serde_json::from_str(&data)?))
            }
            None => {
                debug!(key, "Cache miss");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, value), level = "debug")]
    async fn set_ex<T: Serialize + Sync + Send>(
        &self,
        key: &str,
        value: &T,
        seconds: u64,
    ) -> Result<(), AppError> {
        let data = serde_json::to_string(value)?;
        let mut conn = self.conn.clone();

        let _: () = conn.set_ex(key, data, seconds).await?;
        debug!(key, ttl = seconds, "Cache set");

        Ok(())
    }
}
