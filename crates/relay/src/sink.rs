//! Delivery target for relayed replies.

use async_trait::async_trait;
use huddle_database::{ChatMessage, CreateMessageRequest, MessageRepository, MessageResult};

/// The messaging subsystem's "send bot message" operation.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn send_bot_message(
        &self,
        conversation_id: &str,
        content: &str,
    ) -> MessageResult<ChatMessage>;
}

#[async_trait]
impl MessageSink for MessageRepository {
    async fn send_bot_message(
        &self,
        conversation_id: &str,
        content: &str,
    ) -> MessageResult<ChatMessage> {
        self.create(&CreateMessageRequest::bot_text(conversation_id, content))
            .await
    }
}
