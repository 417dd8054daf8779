//! # Huddle Users Crate
//!
//! This crate provides the user directory for Huddle: provisioning user
//! records, presence and avatar updates, and the membership queries the
//! chat clients issue on behalf of an authenticated caller.
//!
//! ## Architecture
//!
//! - **Services**: `UserService`, generic over the repository traits
//! - **Types**: `CallerIdentity` and shared error re-exports
//! - **Utils**: JWT verification that turns bearer tokens into identities
//!
//! Every read takes the caller identity explicitly; the HTTP boundary
//! resolves it once per request and passes it through.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use huddle_users::{CallerIdentity, UserService};
//!
//! let service = UserService::new(pool);
//! let caller = CallerIdentity::new("https://issuer.example", "user_123");
//! let me = service.get_self(Some(&caller)).await?;
//! ```

pub mod services;
pub mod types;
pub mod utils;

pub use huddle_database::{
    Conversation, ConversationRepository, ProvisionUserRequest, SqlitePool, User, UserError,
    UserRepository, UserResult,
};

pub use services::{ConversationRepo, DirectoryService, UserRepo, UserService};
pub use types::CallerIdentity;
pub use utils::jwt::{Claims, JwtManager, TokenError};
