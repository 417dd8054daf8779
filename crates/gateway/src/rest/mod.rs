//! REST API endpoints for the gateway

pub mod conversations;
pub mod health;
pub mod users;

use std::sync::Arc;

use axum::{middleware as axum_middleware, routing::get, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::middleware::internal_secret_middleware;
use crate::state::GatewayState;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Create all REST API routes
pub fn create_rest_routes(state: Arc<GatewayState>) -> Router<Arc<GatewayState>> {
    let internal = users::create_internal_user_routes().route_layer(
        axum_middleware::from_fn_with_state(state, internal_secret_middleware),
    );

    Router::new()
        .route("/health", get(health::health_check))
        .merge(internal)
        .merge(users::create_user_routes())
        .merge(conversations::create_conversation_routes())
}
