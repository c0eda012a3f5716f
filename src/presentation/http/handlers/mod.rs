//! HTTP Handlers
//!
//! Request handlers for all HTTP endpoints.

pub mod conn;
pub mod health;
pub mod user;
