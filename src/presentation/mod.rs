//! Presentation Layer
//!
//! Protocol adapters over the application services: the HTTP API (axum)
//! and the gRPC API (tonic).

pub mod grpc;
pub mod http;
pub mod middleware;
