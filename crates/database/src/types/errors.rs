//! Error types for the database layer

use thiserror::Error;

/// General database error
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    #[error("Database query error: {0}")]
    QueryError(String),

    #[error("Database migration error: {0}")]
    MigrationError(String),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        DatabaseError::QueryError(error.to_string())
    }
}

/// Errors raised by user directory operations
#[derive(Debug, Error)]
pub enum UserError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("User not found")]
    UserNotFound,

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("Conversation not found: {id}")]
    ConversationNotFound { id: String },

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<DatabaseError> for UserError {
    fn from(error: DatabaseError) -> Self {
        UserError::DatabaseError(error.to_string())
    }
}

/// Errors raised when storing or reading chat messages
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("Conversation not found: {id}")]
    ConversationNotFound { id: String },

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<DatabaseError> for MessageError {
    fn from(error: DatabaseError) -> Self {
        MessageError::DatabaseError(error.to_string())
    }
}
