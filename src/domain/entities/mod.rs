//! # Domain Entities
//!
//! - **User**: a chat participant
//! - **Message**: a direct message between two users
//!
//! Each entity has an associated repository trait defining data access
//! operations, implemented in the infrastructure layer.

mod message;
mod user;

pub use message::{ConnRepository, Message};
pub use user::{User, UserCacheRepository, UserRepository};

#[cfg(test)]
pub use message::MockConnRepository;
#[cfg(test)]
pub use user::{MockUserCacheRepository, MockUserRepository};
