//! Shared types for the user directory.

pub mod identity;

pub use identity::CallerIdentity;
pub use huddle_database::{UserError, UserResult};
