//! User directory REST endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use huddle_database::{ProvisionUserRequest, User};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ErrorResponse;
use crate::error::{GatewayError, GatewayResult};
use crate::middleware::Caller;
use crate::state::GatewayState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub token_identifier: String,
    pub email: String,
    pub name: String,
    pub image: String,
    pub is_online: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            token_identifier: user.token_identifier,
            email: user.email,
            name: user.name,
            image: user.image,
            is_online: user.is_online,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionUserBody {
    pub token_identifier: String,
    pub email: String,
    pub name: String,
    pub image: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAvatarBody {
    pub token_identifier: String,
    pub image: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PresenceBody {
    pub token_identifier: String,
}

fn require_token_identifier(token_identifier: &str) -> GatewayResult<()> {
    if token_identifier.trim().is_empty() {
        return Err(GatewayError::InvalidRequest(
            "tokenIdentifier must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Routes called by the trusted identity webhook
pub fn create_internal_user_routes() -> Router<Arc<GatewayState>> {
    Router::new()
        .route("/internal/users", post(provision_user))
        .route("/internal/users/avatar", post(update_avatar))
        .route("/internal/users/online", post(set_online))
        .route("/internal/users/offline", post(set_offline))
}

pub fn create_user_routes() -> Router<Arc<GatewayState>> {
    Router::new()
        .route("/api/users", get(list_other_users))
        .route("/api/users/me", get(get_current_user))
}

#[utoipa::path(
    post,
    path = "/internal/users",
    tag = "Internal",
    request_body = ProvisionUserBody,
    responses(
        (status = 201, description = "User provisioned", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Missing or invalid internal secret", body = ErrorResponse),
        (status = 409, description = "User already exists", body = ErrorResponse)
    )
)]
pub async fn provision_user(
    State(state): State<Arc<GatewayState>>,
    Json(payload): Json<ProvisionUserBody>,
) -> GatewayResult<impl IntoResponse> {
    require_token_identifier(&payload.token_identifier)?;

    let user = state
        .directory()
        .provision(ProvisionUserRequest {
            token_identifier: payload.token_identifier,
            email: payload.email,
            name: payload.name,
            image: payload.image,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

#[utoipa::path(
    post,
    path = "/internal/users/avatar",
    tag = "Internal",
    request_body = UpdateAvatarBody,
    responses(
        (status = 204, description = "Avatar updated"),
        (status = 401, description = "Missing or invalid internal secret", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub async fn update_avatar(
    State(state): State<Arc<GatewayState>>,
    Json(payload): Json<UpdateAvatarBody>,
) -> GatewayResult<StatusCode> {
    require_token_identifier(&payload.token_identifier)?;

    state
        .directory()
        .update_avatar(&payload.token_identifier, &payload.image)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/internal/users/online",
    tag = "Internal",
    request_body = PresenceBody,
    responses(
        (status = 204, description = "User marked online"),
        (status = 401, description = "Missing or invalid internal secret", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub async fn set_online(
    State(state): State<Arc<GatewayState>>,
    Json(payload): Json<PresenceBody>,
) -> GatewayResult<StatusCode> {
    require_token_identifier(&payload.token_identifier)?;

    state.directory().set_online(&payload.token_identifier).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/internal/users/offline",
    tag = "Internal",
    request_body = PresenceBody,
    responses(
        (status = 204, description = "User marked offline"),
        (status = 401, description = "Missing or invalid internal secret", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub async fn set_offline(
    State(state): State<Arc<GatewayState>>,
    Json(payload): Json<PresenceBody>,
) -> GatewayResult<StatusCode> {
    require_token_identifier(&payload.token_identifier)?;

    state.directory().set_offline(&payload.token_identifier).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    responses(
        (status = 200, description = "Every user except the caller", body = Vec<UserResponse>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn list_other_users(
    State(state): State<Arc<GatewayState>>,
    caller: Caller,
) -> GatewayResult<Json<Vec<UserResponse>>> {
    let users = state.directory().list_others(caller.identity()).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    responses(
        (status = 200, description = "The caller's own record", body = UserResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Caller has no user record", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn get_current_user(
    State(state): State<Arc<GatewayState>>,
    caller: Caller,
) -> GatewayResult<Json<UserResponse>> {
    let user = state.directory().get_self(caller.identity()).await?;
    Ok(Json(user.into()))
}
