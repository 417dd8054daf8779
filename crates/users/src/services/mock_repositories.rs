//! In-memory repository implementations for exercising the service layer
//! without a database.

use std::sync::Arc;

use huddle_database::{
    Conversation, CreateConversationRequest, DatabaseResult, ProvisionUserRequest, User, UserError,
    UserResult,
};
use tokio::sync::RwLock;

/// Mock user repository. Records are kept in insertion order.
#[derive(Clone, Default)]
pub struct MockUserRepository {
    users: Arc<RwLock<Vec<User>>>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn find_by_token_identifier(&self, token_identifier: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|user| user.token_identifier == token_identifier)
            .cloned())
    }

    pub async fn list_all(&self) -> UserResult<Vec<User>> {
        Ok(self.users.read().await.clone())
    }

    pub async fn create(&self, request: &ProvisionUserRequest) -> UserResult<User> {
        let mut users = self.users.write().await;
        if users
            .iter()
            .any(|user| user.token_identifier == request.token_identifier)
        {
            return Err(UserError::UserAlreadyExists);
        }

        let now = chrono::Utc::now().to_rfc3339();
        let user = User {
            id: cuid2::cuid(),
            token_identifier: request.token_identifier.clone(),
            email: request.email.clone(),
            name: request.name.clone(),
            image: request.image.clone(),
            is_online: true,
            created_at: now.clone(),
            updated_at: now,
        };

        users.push(user.clone());
        Ok(user)
    }

    pub async fn update_image(&self, token_identifier: &str, image: &str) -> UserResult<()> {
        self.patch(token_identifier, |user| user.image = image.to_string())
            .await
    }

    pub async fn set_online(&self, token_identifier: &str, is_online: bool) -> UserResult<()> {
        self.patch(token_identifier, |user| user.is_online = is_online)
            .await
    }

    pub async fn count(&self) -> usize {
        self.users.read().await.len()
    }

    async fn patch<F>(&self, token_identifier: &str, apply: F) -> UserResult<()>
    where
        F: FnOnce(&mut User),
    {
        let mut users = self.users.write().await;
        let user = users
            .iter_mut()
            .find(|user| user.token_identifier == token_identifier)
            .ok_or(UserError::UserNotFound)?;

        apply(user);
        user.updated_at = chrono::Utc::now().to_rfc3339();
        Ok(())
    }
}

/// Mock conversation repository
#[derive(Clone, Default)]
pub struct MockConversationRepository {
    conversations: Arc<RwLock<Vec<Conversation>>>,
}

impl MockConversationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn find_by_id(&self, id: &str) -> DatabaseResult<Option<Conversation>> {
        let conversations = self.conversations.read().await;
        Ok(conversations.iter().find(|c| c.id == id).cloned())
    }

    pub async fn create(&self, request: &CreateConversationRequest) -> DatabaseResult<Conversation> {
        let mut participants: Vec<String> = Vec::with_capacity(request.participants.len());
        for participant in &request.participants {
            if !participants.contains(participant) {
                participants.push(participant.clone());
            }
        }

        let conversation = Conversation {
            id: cuid2::cuid(),
            participants,
            is_group: request.is_group,
            group_name: request.group_name.clone(),
            admin: request.admin.clone(),
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        self.conversations.write().await.push(conversation.clone());
        Ok(conversation)
    }
}
