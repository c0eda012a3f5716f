//! Application Services
//!
//! Usecases consumed by both protocol adapters.
//!
//! ## Available Services
//!
//! - **UserService**: user registration and profile lookup
//! - **ConnService**: direct messages between users

pub mod conn_service;
pub mod user_service;

pub use conn_service::{ConnService, ConnServiceImpl, MessageDto, SendMessageDto, SendMessageFailure};
pub use user_service::{CreateUserDto, UserDto, UserError, UserService, UserServiceImpl};
