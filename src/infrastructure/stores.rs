//! Store Connections
//!
//! Opens and releases the relational store and the cache as a unit.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use sqlx::PgPool;
use tracing::{error, info, Instrument, Span};

use super::{cache, database};
use crate::config::Settings;

/// Store connection errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("PostgreSQL connection failed: {0}")]
    Database(#[source] sqlx::Error),

    #[error("Redis connection failed: {0}")]
    Redis(#[source] redis::RedisError),

    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Live handles to PostgreSQL and Redis.
pub struct Stores {
    pub db: PgPool,
    pub redis: ConnectionManager,
}

impl Stores {
    /// Connect to PostgreSQL, then Redis. If Redis fails the pool is closed
    /// again before returning.
    pub async fn connect(settings: &Settings) -> Result<Self, StoreError> {
        let db = database::create_pool(&settings.database)
            .await
            .map_err(StoreError::Database)?;

        let redis = match cache::create_redis_client(&settings.redis).await {
            Ok(redis) => redis,
            Err(e) => {
                db.close().await;
                info!("PostgreSQL connection closed");
                return Err(StoreError::Redis(e));
            }
        };

        Ok(Self { db, redis })
    }

    /// Apply pending schema migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        database::run_migrations(&self.db).await?;
        Ok(())
    }

    /// Readiness probe sharing these connections.
    pub fn probe(&self) -> StoresProbe {
        StoresProbe {
            db: self.db.clone(),
            redis: self.redis.clone(),
        }
    }

    /// Release both stores, cache first, each with its own log line.
    pub async fn close(self, span: &Span) {
        let Stores { db, redis } = self;
        async move {
            drop(redis);
            info!("Redis connection released");

            db.close().await;
            if db.is_closed() {
                info!("PostgreSQL connection closed");
            } else {
                error!("PostgreSQL pool still open after close");
            }
        }
        .instrument(span.clone())
        .await
    }
}

/// Liveness checks against the backing stores.
#[async_trait]
pub trait StoreProbe: Send + Sync {
    async fn ping_database(&self) -> Result<(), String>;

    async fn ping_cache(&self) -> Result<(), String>;
}

/// `StoreProbe` over live connections.
#[derive(Clone)]
pub struct StoresProbe {
    db: PgPool,
    redis: ConnectionManager,
}

#[async_trait]
impl StoreProbe for StoresProbe {
    async fn ping_database(&self) -> Result<(), String> {
        sqlx::query("SELECT 1")
            .execute(&self.db)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    async fn ping_cache(&self) -> Result<(), String> {
        let mut conn = self.redis.clone();
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}
