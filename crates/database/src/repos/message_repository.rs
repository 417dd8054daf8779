//! Repository for chat message data access operations.

use crate::entities::{ChatMessage, CreateMessageRequest, MessageType};
use crate::types::{MessageError, MessageResult};
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

/// Repository for message database operations
#[derive(Clone)]
pub struct MessageRepository {
    pool: SqlitePool,
}

impl MessageRepository {
    /// Create a new message repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a message in an existing conversation
    pub async fn create(&self, request: &CreateMessageRequest) -> MessageResult<ChatMessage> {
        let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM conversations WHERE id = ?")
            .bind(&request.conversation_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| MessageError::DatabaseError(e.to_string()))?;

        if exists.is_none() {
            return Err(MessageError::ConversationNotFound {
                id: request.conversation_id.clone(),
            });
        }

        let message = ChatMessage {
            id: cuid2::cuid(),
            conversation_id: request.conversation_id.clone(),
            sender: request.sender.clone(),
            content: request.content.clone(),
            message_type: request.message_type,
            created_at: Utc::now().to_rfc3339(),
        };

        sqlx::query(
            "INSERT INTO messages (id, conversation_id, sender, content, message_type, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&message.id)
        .bind(&message.conversation_id)
        .bind(&message.sender)
        .bind(&message.content)
        .bind(message.message_type.as_str())
        .bind(&message.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| MessageError::DatabaseError(e.to_string()))?;

        info!(
            message_id = %message.id,
            conversation_id = %message.conversation_id,
            sender = %message.sender,
            "message stored"
        );
        Ok(message)
    }

    /// List the messages of a conversation, oldest first
    pub async fn list_by_conversation(&self, conversation_id: &str) -> MessageResult<Vec<ChatMessage>> {
        let rows = sqlx::query(
            "SELECT id, conversation_id, sender, content, message_type, created_at
             FROM messages WHERE conversation_id = ? ORDER BY rowid ASC",
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| MessageError::DatabaseError(e.to_string()))?;

        rows.iter().map(message_from_row).collect()
    }
}

fn message_from_row(row: &SqliteRow) -> MessageResult<ChatMessage> {
    let get_err = |e: sqlx::Error| MessageError::DatabaseError(e.to_string());
    let message_type: String = row.try_get("message_type").map_err(get_err)?;

    Ok(ChatMessage {
        id: row.try_get("id").map_err(get_err)?,
        conversation_id: row.try_get("conversation_id").map_err(get_err)?,
        sender: row.try_get("sender").map_err(get_err)?,
        content: row.try_get("content").map_err(get_err)?,
        message_type: MessageType::from(message_type.as_str()),
        created_at: row.try_get("created_at").map_err(get_err)?,
    })
}
