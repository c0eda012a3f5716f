//! Application settings and configuration structures.

use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::shared::snowflake::MAX_MACHINE_ID;

/// Root configuration structure containing all application settings.
///
/// Read once at startup and never mutated afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Listener configuration (host, HTTP port, gRPC port)
    pub server: ServerSettings,

    /// Database configuration (PostgreSQL)
    pub database: DatabaseSettings,

    /// Redis configuration
    pub redis: RedisSettings,

    /// CORS configuration
    pub cors: CorsSettings,

    /// Snowflake ID generator settings
    pub snowflake: SnowflakeSettings,

    /// Current environment (development, staging, production)
    pub environment: String,
}

/// Listener configuration shared by the HTTP and gRPC front-ends.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Host address both listeners bind to (e.g., "0.0.0.0")
    pub host: String,

    /// Port of the HTTP listener
    pub http_port: u16,

    /// Port of the gRPC listener
    pub grpc_port: u16,

    /// Upper bound for draining a single listener during shutdown
    pub shutdown_timeout_secs: u64,
}

/// PostgreSQL database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Database connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections to maintain
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    pub acquire_timeout: u64,
}

/// Redis configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RedisSettings {
    /// Redis connection URL
    pub url: String,

    /// Lifetime of cached user profiles in seconds
    pub user_ttl_secs: u64,
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    /// Allowed origins (comma-separated in env)
    pub allowed_origins: Vec<String>,
}

/// Snowflake ID generator configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SnowflakeSettings {
    /// Machine/worker ID (0-1023)
    pub machine_id: u16,
}

impl Settings {
    /// Load settings from environment variables and configuration files.
    ///
    /// The loading order is:
    /// 1. Built-in defaults
    /// 2. config/default.toml (base configuration)
    /// 3. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 4. `APP__*` environment variables
    /// 5. `SERVER_HOST`, `HTTP_PORT`, `GRPC_PORT`, `DATABASE_URL`, `REDIS_URL`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or parsed,
    /// or if the listener settings are inconsistent.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        Config::builder()
            .set_default("environment", environment.clone())?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.http_port", 8080)?
            .set_default("server.grpc_port", 50051)?
            .set_default("server.shutdown_timeout_secs", 30)?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout", 30)?
            .set_default("redis.user_ttl_secs", 300)?
            .set_default("cors.allowed_origins", vec!["http://localhost:3000"])?
            .set_default("snowflake.machine_id", 1)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // APP__SERVER__HTTP_PORT=8080 -> server.http_port = 8080
            .add_source(
                Environment::default()
                    .prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.http_port", std::env::var("HTTP_PORT").ok())?
            .set_override_option("server.grpc_port", std::env::var("GRPC_PORT").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("redis.url", std::env::var("REDIS_URL").ok())?
            .build()?
            .try_deserialize()
            .and_then(|settings: Self| {
                settings.server.validate()?;
                settings.snowflake.validate()?;
                Ok(settings)
            })
    }
}

impl ServerSettings {
    /// Reject listener settings that cannot work together.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http_port == self.grpc_port && self.http_port != 0 {
            return Err(ConfigError::Message(format!(
                "HTTP and gRPC listeners cannot share port {}",
                self.http_port
            )));
        }
        if self.shutdown_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "server.shutdown_timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Address of the HTTP listener as `host:port`.
    pub fn http_addr(&self) -> String {
        socket_addr(&self.host, self.http_port)
    }

    /// Address of the gRPC listener as `host:port`.
    pub fn grpc_addr(&self) -> String {
        socket_addr(&self.host, self.grpc_port)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl SnowflakeSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.machine_id > MAX_MACHINE_ID {
            return Err(ConfigError::Message(format!(
                "snowflake.machine_id must be between 0 and {}, got {}",
                MAX_MACHINE_ID, self.machine_id
            )));
        }
        Ok(())
    }
}

/// Join host and port, bracketing bare IPv6 hosts.
fn socket_addr(host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    }
}
