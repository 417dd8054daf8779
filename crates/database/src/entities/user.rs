//! User entity definitions

use serde::{Deserialize, Serialize};

/// A user account record. `token_identifier` is the stable key issued by the
/// identity provider and is unique across the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub token_identifier: String,
    pub email: String,
    pub name: String,
    pub image: String,
    pub is_online: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Request for provisioning a new user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionUserRequest {
    pub token_identifier: String,
    pub email: String,
    pub name: String,
    pub image: String,
}
