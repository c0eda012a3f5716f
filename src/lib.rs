//! # Chat Core API
//!
//! User and direct-message operations served over two protocols at once:
//! - RESTful HTTP API (axum)
//! - gRPC API with reflection and health checks (tonic)
//! - PostgreSQL for persistent storage
//! - Redis for caching
//!
//! ## Architecture
//!
//! - **Domain Layer**: Core entities and repository traits
//! - **Application Layer**: Usecases and DTOs
//! - **Infrastructure Layer**: Database, cache and metrics
//! - **Presentation Layer**: HTTP and gRPC adapters
//! - **Server**: Supervisor owning both listeners
//! - **Startup**: Process lifecycle
//!
//! ## Module Structure
//!
//! ```text
//! chat_core_api/
//! +-- config/         Configuration management
//! +-- domain/         Domain entities and traits
//! +-- application/    Application services and DTOs
//! +-- infrastructure/ Database, cache and metrics implementations
//! +-- presentation/   HTTP routes and gRPC services
//! +-- server/         Listener supervision and graceful shutdown
//! +-- shared/         Common utilities (errors, snowflake IDs)
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP and gRPC adapters
pub mod presentation;

// Server supervisor
pub mod server;

// Shared utilities
pub mod shared;

// Application startup and lifecycle
pub mod startup;

// Telemetry and observability
pub mod telemetry;
