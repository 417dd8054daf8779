//! Conversation REST endpoints: membership, relay, and message listing

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use huddle_database::ChatMessage;
use huddle_relay::RelayOutcome;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::users::UserResponse;
use super::ErrorResponse;
use crate::error::{GatewayError, GatewayResult};
use crate::middleware::Caller;
use crate::state::GatewayState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: String,
    pub conversation_id: String,
    pub sender: String,
    pub content: String,
    pub message_type: String,
    pub created_at: String,
}

impl From<ChatMessage> for MessageResponse {
    fn from(message: ChatMessage) -> Self {
        Self {
            id: message.id,
            conversation_id: message.conversation_id,
            sender: message.sender,
            content: message.content,
            message_type: message.message_type.to_string(),
            created_at: message.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RelayMessageBody {
    pub message_body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RelayResponse {
    pub message: MessageResponse,
    pub used_fallback: bool,
}

impl From<RelayOutcome> for RelayResponse {
    fn from(outcome: RelayOutcome) -> Self {
        Self {
            message: outcome.message.into(),
            used_fallback: outcome.used_fallback,
        }
    }
}

pub fn create_conversation_routes() -> Router<Arc<GatewayState>> {
    Router::new()
        .route(
            "/api/conversations/:conversation_id/members",
            get(list_group_members),
        )
        .route(
            "/api/conversations/:conversation_id/relay",
            post(relay_message),
        )
        .route(
            "/api/conversations/:conversation_id/messages",
            get(list_messages),
        )
}

#[utoipa::path(
    get,
    path = "/api/conversations/{conversation_id}/members",
    tag = "Conversations",
    params(
        ("conversation_id" = String, Path, description = "Conversation id")
    ),
    responses(
        (status = 200, description = "Users participating in the conversation", body = Vec<UserResponse>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Conversation not found", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn list_group_members(
    Path(conversation_id): Path<String>,
    State(state): State<Arc<GatewayState>>,
    caller: Caller,
) -> GatewayResult<Json<Vec<UserResponse>>> {
    let members = state
        .directory()
        .get_group_members(caller.identity(), &conversation_id)
        .await?;

    Ok(Json(members.into_iter().map(UserResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/conversations/{conversation_id}/relay",
    tag = "Conversations",
    params(
        ("conversation_id" = String, Path, description = "Conversation id")
    ),
    request_body = RelayMessageBody,
    responses(
        (status = 200, description = "Bot reply posted to the conversation", body = RelayResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Conversation not found", body = ErrorResponse),
        (status = 502, description = "Completion provider failed", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn relay_message(
    Path(conversation_id): Path<String>,
    State(state): State<Arc<GatewayState>>,
    caller: Caller,
    Json(payload): Json<RelayMessageBody>,
) -> GatewayResult<Json<RelayResponse>> {
    if caller.identity().is_none() {
        return Err(GatewayError::Unauthorized(
            "Missing or invalid identity".to_string(),
        ));
    }

    let outcome = state
        .relay()
        .relay_message(&payload.message_body, &conversation_id)
        .await?;

    Ok(Json(outcome.into()))
}

#[utoipa::path(
    get,
    path = "/api/conversations/{conversation_id}/messages",
    tag = "Conversations",
    params(
        ("conversation_id" = String, Path, description = "Conversation id")
    ),
    responses(
        (status = 200, description = "Messages in posting order", body = Vec<MessageResponse>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Conversation not found", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn list_messages(
    Path(conversation_id): Path<String>,
    State(state): State<Arc<GatewayState>>,
    caller: Caller,
) -> GatewayResult<Json<Vec<MessageResponse>>> {
    if caller.identity().is_none() {
        return Err(GatewayError::Unauthorized(
            "Missing or invalid identity".to_string(),
        ));
    }

    if state.conversations.find_by_id(&conversation_id).await?.is_none() {
        return Err(GatewayError::NotFound(format!(
            "Conversation {conversation_id} not found"
        )));
    }

    let messages = state.messages.list_by_conversation(&conversation_id).await?;
    Ok(Json(messages.into_iter().map(MessageResponse::from).collect()))
}
