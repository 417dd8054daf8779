//! Conversation entity definitions

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    /// User ids in the order they were added.
    pub participants: Vec<String>,
    pub is_group: bool,
    pub group_name: Option<String>,
    pub admin: Option<String>,
    pub created_at: String,
}

impl Conversation {
    pub fn has_participant(&self, user_id: &str) -> bool {
        self.participants.iter().any(|participant| participant == user_id)
    }
}

/// Request for creating a conversation. Only seeding and tests create
/// conversations; the directory treats them as read-only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConversationRequest {
    pub participants: Vec<String>,
    pub is_group: bool,
    pub group_name: Option<String>,
    pub admin: Option<String>,
}
