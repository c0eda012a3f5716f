//! Repository Implementations
//!
//! PostgreSQL implementations of domain repository traits.
//!
//! - **PgUserRepository** - user accounts
//! - **PgConnRepository** - direct messages

pub mod conn_repository;
pub mod user_repository;

pub use conn_repository::PgConnRepository;
pub use user_repository::PgUserRepository;
