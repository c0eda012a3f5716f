//! # Configuration Module
//!
//! This module handles application configuration loading and management.
//! Configuration can be loaded from:
//! - Environment variables (prefixed with APP__, plus a few plain names)
//! - Configuration files (config/default.toml, config/{environment}.toml)
//! - .env files (via dotenvy)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chat_core_api::config::Settings;
//!
//! let settings = Settings::load()?;
//! println!("HTTP on {}, gRPC on {}", settings.server.http_addr(), settings.server.grpc_addr());
//! ```

mod settings;

pub use settings::*;
