//! # Domain Layer
//!
//! Core entities of the chat API and the repository traits the usecases
//! depend on. No dependencies on infrastructure or presentation layers.

pub mod entities;

pub use entities::*;
