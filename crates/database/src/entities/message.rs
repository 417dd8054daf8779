//! Message entity definitions

use serde::{Deserialize, Serialize};

/// Sender name attached to messages posted by the chat relay bot.
pub const BOT_SENDER: &str = "ChatGPT";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub conversation_id: String,
    pub sender: String,
    pub content: String,
    pub message_type: MessageType,
    pub created_at: String,
}

impl ChatMessage {
    pub fn is_from_bot(&self) -> bool {
        self.sender == BOT_SENDER
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageRequest {
    pub conversation_id: String,
    pub sender: String,
    pub content: String,
    pub message_type: MessageType,
}

impl CreateMessageRequest {
    /// A text message attributed to the relay bot.
    pub fn bot_text(conversation_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            sender: BOT_SENDER.to_string(),
            content: content.into(),
            message_type: MessageType::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Text,
    Image,
    Video,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Text => "text",
            MessageType::Image => "image",
            MessageType::Video => "video",
        }
    }
}

impl From<&str> for MessageType {
    fn from(s: &str) -> Self {
        match s {
            "image" => MessageType::Image,
            "video" => MessageType::Video,
            _ => MessageType::Text,
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
