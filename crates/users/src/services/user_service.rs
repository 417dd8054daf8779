//! User directory service.

use std::future::Future;

use huddle_database::{
    Conversation, ConversationRepository, DatabaseResult, ProvisionUserRequest, User,
    UserRepository, UserResult,
};
use sqlx::sqlite::SqlitePool;
use tracing::{debug, info};

use super::mock_repositories::{MockConversationRepository, MockUserRepository};
use crate::types::{CallerIdentity, UserError};

/// The directory backed by the SQLite repositories.
pub type DirectoryService = UserService<UserRepository, ConversationRepository>;

/// Directory operations over a user store and a conversation store.
///
/// Writes are issued by trusted internal callers and are keyed by
/// `token_identifier`. Reads take the caller identity explicitly and fail
/// with [`UserError::Unauthorized`] when it is absent.
#[derive(Clone)]
pub struct UserService<U, C> {
    user_repository: U,
    conversation_repository: C,
}

impl UserService<UserRepository, ConversationRepository> {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            user_repository: UserRepository::new(pool.clone()),
            conversation_repository: ConversationRepository::new(pool),
        }
    }
}

impl UserService<MockUserRepository, MockConversationRepository> {
    pub fn new_for_testing() -> Self {
        Self {
            user_repository: MockUserRepository::new(),
            conversation_repository: MockConversationRepository::new(),
        }
    }
}

impl<U, C> UserService<U, C>
where
    U: UserRepo,
    C: ConversationRepo,
{
    /// Create a user record, initially online.
    ///
    /// No uniqueness pre-check happens here; a duplicate `token_identifier`
    /// is rejected by the store.
    pub async fn provision(&self, request: ProvisionUserRequest) -> UserResult<User> {
        let user = self.user_repository.create(&request).await?;
        info!(
            token_identifier = %user.token_identifier,
            user_id = %user.id,
            "provisioned user"
        );
        Ok(user)
    }

    pub async fn update_avatar(&self, token_identifier: &str, image: &str) -> UserResult<()> {
        self.user_repository
            .update_image(token_identifier, image)
            .await?;
        debug!(%token_identifier, "updated avatar");
        Ok(())
    }

    pub async fn set_online(&self, token_identifier: &str) -> UserResult<()> {
        self.set_presence(token_identifier, true).await
    }

    pub async fn set_offline(&self, token_identifier: &str) -> UserResult<()> {
        self.set_presence(token_identifier, false).await
    }

    /// All users except the caller, in store order.
    pub async fn list_others(&self, caller: Option<&CallerIdentity>) -> UserResult<Vec<User>> {
        let caller = require_caller(caller)?;

        let users = self.user_repository.list_all().await?;
        Ok(users
            .into_iter()
            .filter(|user| user.token_identifier != caller.token_identifier)
            .collect())
    }

    pub async fn get_self(&self, caller: Option<&CallerIdentity>) -> UserResult<User> {
        let caller = require_caller(caller)?;

        self.user_repository
            .find_by_token_identifier(&caller.token_identifier)
            .await?
            .ok_or(UserError::UserNotFound)
    }

    /// Users whose id is listed in the conversation's participants,
    /// regardless of presence, in store order.
    pub async fn get_group_members(
        &self,
        caller: Option<&CallerIdentity>,
        conversation_id: &str,
    ) -> UserResult<Vec<User>> {
        require_caller(caller)?;

        let conversation = self
            .conversation_repository
            .find_by_id(conversation_id)
            .await?
            .ok_or_else(|| UserError::ConversationNotFound {
                id: conversation_id.to_string(),
            })?;

        let users = self.user_repository.list_all().await?;
        Ok(users
            .into_iter()
            .filter(|user| conversation.has_participant(&user.id))
            .collect())
    }

    async fn set_presence(&self, token_identifier: &str, is_online: bool) -> UserResult<()> {
        self.user_repository
            .set_online(token_identifier, is_online)
            .await?;
        debug!(%token_identifier, is_online, "updated presence");
        Ok(())
    }
}

fn require_caller(caller: Option<&CallerIdentity>) -> UserResult<&CallerIdentity> {
    caller.ok_or(UserError::Unauthorized)
}

/// Trait for user stores to allow generic usage
pub trait UserRepo: Send + Sync {
    fn find_by_token_identifier(
        &self,
        token_identifier: &str,
    ) -> impl Future<Output = UserResult<Option<User>>> + Send;
    fn list_all(&self) -> impl Future<Output = UserResult<Vec<User>>> + Send;
    fn create(&self, request: &ProvisionUserRequest) -> impl Future<Output = UserResult<User>> + Send;
    fn update_image(
        &self,
        token_identifier: &str,
        image: &str,
    ) -> impl Future<Output = UserResult<()>> + Send;
    fn set_online(
        &self,
        token_identifier: &str,
        is_online: bool,
    ) -> impl Future<Output = UserResult<()>> + Send;
}

/// Trait for conversation stores to allow generic usage
pub trait ConversationRepo: Send + Sync {
    fn find_by_id(&self, id: &str) -> impl Future<Output = DatabaseResult<Option<Conversation>>> + Send;
}

impl UserRepo for UserRepository {
    async fn find_by_token_identifier(&self, token_identifier: &str) -> UserResult<Option<User>> {
        self.find_by_token_identifier(token_identifier).await
    }

    async fn list_all(&self) -> UserResult<Vec<User>> {
        self.list_all().await
    }

    async fn create(&self, request: &ProvisionUserRequest) -> UserResult<User> {
        self.create(request).await
    }

    async fn update_image(&self, token_identifier: &str, image: &str) -> UserResult<()> {
        self.update_image(token_identifier, image).await
    }

    async fn set_online(&self, token_identifier: &str, is_online: bool) -> UserResult<()> {
        self.set_online(token_identifier, is_online).await
    }
}

impl UserRepo for MockUserRepository {
    async fn find_by_token_identifier(&self, token_identifier: &str) -> UserResult<Option<User>> {
        self.find_by_token_identifier(token_identifier).await
    }

    async fn list_all(&self) -> UserResult<Vec<User>> {
        self.list_all().await
    }

    async fn create(&self, request: &ProvisionUserRequest) -> UserResult<User> {
        self.create(request).await
    }

    async fn update_image(&self, token_identifier: &str, image: &str) -> UserResult<()> {
        self.update_image(token_identifier, image).await
    }

    async fn set_online(&self, token_identifier: &str, is_online: bool) -> UserResult<()> {
        self.set_online(token_identifier, is_online).await
    }
}

impl ConversationRepo for ConversationRepository {
    async fn find_by_id(&self, id: &str) -> DatabaseResult<Option<Conversation>> {
        self.find_by_id(id).await
    }
}

impl ConversationRepo for MockConversationRepository {
    async fn find_by_id(&self, id: &str) -> DatabaseResult<Option<Conversation>> {
        self.find_by_id(id).await
    }
}
