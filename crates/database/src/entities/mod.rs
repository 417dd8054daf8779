//! Entity definitions for the database layer

pub mod conversation;
pub mod message;
pub mod user;

pub use conversation::{Conversation, CreateConversationRequest};
pub use message::{ChatMessage, CreateMessageRequest, MessageType, BOT_SENDER};
pub use user::{ProvisionUserRequest, User};
