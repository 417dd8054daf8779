//! # Huddle Gateway Crate
//!
//! HTTP boundary for the Huddle backend. Resolves the caller identity from the
//! bearer token once per request and routes to the user directory and the
//! chat relay.
//!
//! ## Architecture
//!
//! - **REST**: HTTP API endpoints with OpenAPI documentation
//! - **State**: Shared services handed to every handler
//! - **Middleware**: Identity resolution, internal secret checks, CORS, logging
//!
//! ## Usage
//!
//! ```rust,ignore
//! use huddle_gateway::{create_router, GatewayState};
//!
//! let state = GatewayState::new(pool, relay, jwt, config.auth.internal_secret.clone());
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:7070").await?;
//! axum::serve(listener, create_router(state)).await?;
//! ```

pub mod error;
pub mod middleware;
pub mod rest;
pub mod state;

pub use error::{GatewayError, GatewayResult};
pub use middleware::{Caller, INTERNAL_SECRET_HEADER};
pub use state::GatewayState;

use std::sync::Arc;

use axum::{middleware as axum_middleware, Router};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        rest::health::health_check,
        rest::users::provision_user,
        rest::users::update_avatar,
        rest::users::set_online,
        rest::users::set_offline,
        rest::users::list_other_users,
        rest::users::get_current_user,
        rest::conversations::list_group_members,
        rest::conversations::relay_message,
        rest::conversations::list_messages,
    ),
    components(
        schemas(
            rest::ErrorResponse,
            rest::health::HealthResponse,
            rest::users::UserResponse,
            rest::users::ProvisionUserBody,
            rest::users::UpdateAvatarBody,
            rest::users::PresenceBody,
            rest::conversations::MessageResponse,
            rest::conversations::RelayMessageBody,
            rest::conversations::RelayResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Internal", description = "User provisioning for trusted callers"),
        (name = "Users", description = "User directory"),
        (name = "Conversations", description = "Group members and the chat relay"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the main application router with all routes
pub fn create_router(state: GatewayState) -> Router {
    let arc_state = Arc::new(state);

    Router::new()
        .merge(rest::create_rest_routes(arc_state.clone()))
        .layer(axum_middleware::from_fn_with_state(
            arc_state.clone(),
            middleware::identity_middleware,
        ))
        .with_state(arc_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(middleware::create_cors_middleware())
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
}
