//! Service layer for the user directory.

pub mod mock_repositories;
pub mod user_service;

pub use mock_repositories::{MockConversationRepository, MockUserRepository};
pub use user_service::{ConversationRepo, DirectoryService, UserRepo, UserService};
