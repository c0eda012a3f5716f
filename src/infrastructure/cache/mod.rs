//! Cache Module
//!
//! Redis connection management and caching utilities.
//!
//! ```text
//! UserService --> UserCacheRepository --> RedisUserCache --> Cache (RedisCache) --> ConnectionManager
//! ```

mod cache_service;
mod user_cache;

pub use cache_service::{Cache, RedisCache};
pub use user_cache::RedisUserCache;

use redis::aio::ConnectionManager;
use redis::Client;
use tracing::{info, instrument};

use crate::config::RedisSettings;

/// Creates a Redis connection manager with automatic reconnection.
///
/// Fails if the server cannot be reached at startup.
#[instrument(skip(settings), fields(url = %settings.url))]
pub async fn create_redis_client(
    settings: &RedisSettings,
) -> Result<ConnectionManager, redis::RedisError> {
    info!("Connecting to Redis...");
    let client = Client::open(settings.url.as_str())?;
    let manager = ConnectionManager::new(client).await?;
    info!("Redis connection established");
    Ok(manager)
}

/// Cache key prefixes for different data types.
pub mod keys {
    /// Prefix for user profile cache (e.g., "user:user_id")
    pub const USER_PROFILE: &str = "user:";

    /// Generates a user profile cache key
    #[inline]
    pub fn user(user_id: impl std::fmt::Display) -> String {
        format!("{}{}", USER_PROFILE, user_id)
    }
}
