//! HTTP Adapter

pub mod handlers;
pub mod routes;
