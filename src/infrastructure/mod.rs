//! Infrastructure Layer
//!
//! Implementations for external services:
//! - Database repositories (PostgreSQL)
//! - Cache implementations (Redis)
//! - Prometheus metrics
//! - Store connection lifecycle

pub mod cache;
pub mod database;
pub mod metrics;
pub mod repositories;
pub mod stores;

pub use stores::{StoreError, StoreProbe, Stores, StoresProbe};
