//! Database repository implementations

pub mod conversation_repository;
pub mod message_repository;
pub mod user_repository;

pub use conversation_repository::*;
pub use message_repository::*;
pub use user_repository::*;
