//! Repository for conversation data access operations.

use crate::entities::{Conversation, CreateConversationRequest};
use crate::types::DatabaseResult;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::debug;

/// Repository for conversation database operations
#[derive(Clone)]
pub struct ConversationRepository {
    pool: SqlitePool,
}

impl ConversationRepository {
    /// Create a new conversation repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a conversation and its participants by ID
    pub async fn find_by_id(&self, id: &str) -> DatabaseResult<Option<Conversation>> {
        let row = sqlx::query(
            "SELECT id, is_group, group_name, admin, created_at FROM conversations WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let participants = self.participants(id).await?;

        Ok(Some(Conversation {
            id: row.try_get("id")?,
            participants,
            is_group: row.try_get("is_group")?,
            group_name: row.try_get("group_name")?,
            admin: row.try_get("admin")?,
            created_at: row.try_get("created_at")?,
        }))
    }

    /// List every conversation in insertion order
    pub async fn list_all(&self) -> DatabaseResult<Vec<Conversation>> {
        let ids: Vec<String> =
            sqlx::query_scalar("SELECT id FROM conversations ORDER BY rowid ASC")
                .fetch_all(&self.pool)
                .await?;

        let mut conversations = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(conversation) = self.find_by_id(&id).await? {
                conversations.push(conversation);
            }
        }
        Ok(conversations)
    }

    /// Create a conversation with its participant list
    pub async fn create(&self, request: &CreateConversationRequest) -> DatabaseResult<Conversation> {
        let conversation = Conversation {
            id: cuid2::cuid(),
            participants: dedup_preserving_order(&request.participants),
            is_group: request.is_group,
            group_name: request.group_name.clone(),
            admin: request.admin.clone(),
            created_at: Utc::now().to_rfc3339(),
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO conversations (id, is_group, group_name, admin, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&conversation.id)
        .bind(conversation.is_group)
        .bind(&conversation.group_name)
        .bind(&conversation.admin)
        .bind(&conversation.created_at)
        .execute(&mut *tx)
        .await?;

        for (position, user_id) in conversation.participants.iter().enumerate() {
            sqlx::query(
                "INSERT INTO conversation_participants (conversation_id, user_id, position) VALUES (?, ?, ?)",
            )
            .bind(&conversation.id)
            .bind(user_id)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        debug!(
            conversation_id = %conversation.id,
            participants = conversation.participants.len(),
            "created conversation"
        );
        Ok(conversation)
    }

    async fn participants(&self, conversation_id: &str) -> DatabaseResult<Vec<String>> {
        let participants: Vec<String> = sqlx::query_scalar(
            "SELECT user_id FROM conversation_participants WHERE conversation_id = ? ORDER BY position ASC",
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(participants)
    }
}

fn dedup_preserving_order(ids: &[String]) -> Vec<String> {
    let mut seen = Vec::with_capacity(ids.len());
    for id in ids {
        if !seen.contains(id) {
            seen.push(id.clone());
        }
    }
    seen
}
