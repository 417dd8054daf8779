//! Shared application state for the gateway

use std::sync::Arc;

use huddle_database::{ConversationRepository, MessageRepository, SqlitePool};
use huddle_relay::RelayService;
use huddle_users::{DirectoryService, JwtManager, UserService};

/// Shared application state containing all services
#[derive(Clone)]
pub struct GatewayState {
    /// User directory
    pub directory: Arc<DirectoryService>,
    pub conversations: ConversationRepository,
    pub messages: MessageRepository,
    pub relay: Arc<RelayService>,
    /// Verifies bearer tokens into caller identities
    pub jwt: JwtManager,
    /// Shared secret expected on internal routes; `None` rejects them all
    pub internal_secret: Option<String>,
}

impl GatewayState {
    pub fn new(
        pool: SqlitePool,
        relay: RelayService,
        jwt: JwtManager,
        internal_secret: Option<String>,
    ) -> Self {
        Self {
            directory: Arc::new(UserService::new(pool.clone())),
            conversations: ConversationRepository::new(pool.clone()),
            messages: MessageRepository::new(pool),
            relay: Arc::new(relay),
            jwt,
            internal_secret: internal_secret.filter(|secret| !secret.is_empty()),
        }
    }

    pub fn directory(&self) -> &DirectoryService {
        &self.directory
    }

    pub fn relay(&self) -> &RelayService {
        &self.relay
    }
}
