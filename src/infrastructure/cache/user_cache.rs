//! User Cache
//!
//! Redis implementation of `UserCacheRepository`.

use async_trait::async_trait;

use super::{keys, Cache, RedisCache};
use crate::domain::{User, UserCacheRepository};
use crate::shared::error::AppError;

/// Caches user profiles under `user:{id}` with a fixed TTL.
#[derive(Clone)]
pub struct RedisUserCache {
    cache: RedisCache,
    ttl_secs: u64,
}

impl RedisUserCache {
    pub fn new(cache: RedisCache, ttl_secs: u64) -> Self {
        Self { cache, ttl_secs }
    }
}

#[async_trait]
impl UserCacheRepository for RedisUserCache {
    async fn get_user(&self, id: i64) -> Result<Option<User>, AppError> {
        self.cache.get(&keys::user(id)).await
    }

    async fn set_user(&self, user: &User) -> Result<(), AppError> {
        self.cache
            .set_ex(&keys::user(user.id), user, self.ttl_secs)
            .await
    }
}
