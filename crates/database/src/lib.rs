//! Huddle Database Crate
//!
//! This crate provides database functionality for the Huddle backend,
//! including connection management, migrations, and repository implementations
//! for users, conversations, and chat messages.

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod types;

pub use connection::prepare_database;
pub use migrations::run_migrations;

// Re-export repositories
pub use repos::{ConversationRepository, MessageRepository, UserRepository};

// Re-export entities
pub use entities::{
    conversation::{Conversation, CreateConversationRequest},
    message::{ChatMessage, CreateMessageRequest, MessageType, BOT_SENDER},
    user::{ProvisionUserRequest, User},
};

// Re-export types
pub use types::{
    errors::{DatabaseError, MessageError, UserError},
    DatabaseResult, MessageResult, UserResult,
};

pub use huddle_config::DatabaseConfig;
pub use sqlx::SqlitePool;

/// Initialize the database with migrations
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::ConnectionError(format!("{e:#}")))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(format!("{e:#}")))?;

    Ok(pool)
}
