//! Helpers shared across the user directory.

pub mod jwt;

pub use jwt::{Claims, JwtManager, TokenError};
