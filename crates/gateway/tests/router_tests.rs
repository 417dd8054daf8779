//! Router-level tests driving the gateway through `tower::ServiceExt::oneshot`.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use huddle_config::{CompletionFailurePolicy, RelayConfig};
use huddle_database::{
    initialize_database, ConversationRepository, CreateConversationRequest, DatabaseConfig,
    MessageRepository, SqlitePool,
};
use huddle_gateway::{create_router, GatewayState, INTERNAL_SECRET_HEADER};
use huddle_relay::{
    CompletionError, CompletionProvider, CompletionRequest, CompletionResponse, RelayService,
};
use huddle_users::JwtManager;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

const INTERNAL_SECRET: &str = "internal-test-secret";

struct FixedProvider {
    reply: Option<String>,
    fail: bool,
    calls: Mutex<usize>,
}

#[async_trait]
impl CompletionProvider for FixedProvider {
    async fn complete(
        &self,
        _request: CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        *self.calls.lock().unwrap() += 1;
        if self.fail {
            return Err(CompletionError::Status {
                status: 500,
                body: "unavailable".to_string(),
            });
        }
        Ok(CompletionResponse {
            content: self.reply.clone(),
        })
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

struct TestApp {
    router: Router,
    pool: SqlitePool,
    jwt: JwtManager,
    _temp_dir: TempDir,
}

impl TestApp {
    async fn new(reply: Option<&str>, fail: bool, policy: CompletionFailurePolicy) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let pool = initialize_database(&DatabaseConfig {
            url: format!("sqlite://{}", temp_dir.path().join("gateway.db").display()),
            max_connections: 2,
        })
        .await
        .unwrap();

        let provider = Arc::new(FixedProvider {
            reply: reply.map(str::to_string),
            fail,
            calls: Mutex::new(0),
        });
        let relay_config = RelayConfig {
            on_completion_failure: policy,
            ..RelayConfig::default()
        };
        let relay = RelayService::new(
            provider,
            Arc::new(MessageRepository::new(pool.clone())),
            &relay_config,
        );
        let jwt = JwtManager::new("gateway-test-secret", "huddle", "huddle-clients");

        let state = GatewayState::new(
            pool.clone(),
            relay,
            jwt.clone(),
            Some(INTERNAL_SECRET.to_string()),
        );

        Self {
            router: create_router(state),
            pool,
            jwt,
            _temp_dir: temp_dir,
        }
    }

    async fn standard() -> Self {
        Self::new(Some("4. That is correct."), false, CompletionFailurePolicy::Fallback).await
    }

    fn token_for(&self, subject: &str) -> String {
        self.jwt.generate_token(subject, None, None).unwrap()
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn internal_post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .header(INTERNAL_SECRET_HEADER, INTERNAL_SECRET)
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    async fn provision(&self, subject: &str) -> Value {
        let (status, body) = self
            .internal_post(
                "/internal/users",
                json!({
                    "tokenIdentifier": format!("huddle|{subject}"),
                    "email": format!("{subject}@example.com"),
                    "name": subject,
                    "image": format!("https://example.com/{subject}.png"),
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }

    async fn get_as(&self, uri: &str, subject: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::get(uri);
        if let Some(subject) = subject {
            builder = builder.header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.token_for(subject)),
            );
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn relay_as(&self, conversation_id: &str, subject: &str, text: &str) -> (StatusCode, Value) {
        self.send(
            Request::post(format!("/api/conversations/{conversation_id}/relay"))
                .header(header::CONTENT_TYPE, "application/json")
                .header(
                    header::AUTHORIZATION,
                    format!("Bearer {}", self.token_for(subject)),
                )
                .body(Body::from(json!({ "messageBody": text }).to_string()))
                .unwrap(),
        )
        .await
    }

    async fn conversation(&self, participants: Vec<String>) -> String {
        ConversationRepository::new(self.pool.clone())
            .create(&CreateConversationRequest {
                participants,
                is_group: true,
                group_name: Some("Group".to_string()),
                admin: None,
            })
            .await
            .unwrap()
            .id
    }
}

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::standard().await;

    let (status, body) = app.get_as("/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn provision_then_get_self() {
    let app = TestApp::standard().await;
    let created = app.provision("ada").await;

    let (status, me) = app.get_as("/api/users/me", Some("ada")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(me, created);
    assert_eq!(me["isOnline"], true);
    assert_eq!(me["tokenIdentifier"], "huddle|ada");
}

#[tokio::test]
async fn internal_routes_require_matching_secret() {
    let app = TestApp::standard().await;
    let payload = json!({
        "tokenIdentifier": "huddle|eve",
        "email": "eve@example.com",
        "name": "eve",
        "image": "",
    });

    let (missing, body) = app
        .send(
            Request::post("/internal/users")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await;
    let (wrong, _) = app
        .send(
            Request::post("/internal/users")
                .header(header::CONTENT_TYPE, "application/json")
                .header(INTERNAL_SECRET_HEADER, "guess")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await;

    assert_eq!(missing, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "401");
    assert_eq!(wrong, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get_as("/api/users", Some("ada")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn duplicate_provision_conflicts() {
    let app = TestApp::standard().await;
    app.provision("ada").await;

    let (status, _) = app
        .internal_post(
            "/internal/users",
            json!({
                "tokenIdentifier": "huddle|ada",
                "email": "other@example.com",
                "name": "other",
                "image": "",
            }),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn presence_and_avatar_updates() {
    let app = TestApp::standard().await;
    app.provision("ada").await;

    let (online, _) = app
        .internal_post("/internal/users/online", json!({ "tokenIdentifier": "huddle|ada" }))
        .await;
    let (offline, _) = app
        .internal_post("/internal/users/offline", json!({ "tokenIdentifier": "huddle|ada" }))
        .await;
    let (avatar, _) = app
        .internal_post(
            "/internal/users/avatar",
            json!({ "tokenIdentifier": "huddle|ada", "image": "https://example.com/new.png" }),
        )
        .await;

    assert_eq!(online, StatusCode::NO_CONTENT);
    assert_eq!(offline, StatusCode::NO_CONTENT);
    assert_eq!(avatar, StatusCode::NO_CONTENT);

    let (_, me) = app.get_as("/api/users/me", Some("ada")).await;
    assert_eq!(me["isOnline"], false);
    assert_eq!(me["image"], "https://example.com/new.png");

    let (missing, _) = app
        .internal_post("/internal/users/online", json!({ "tokenIdentifier": "huddle|nobody" }))
        .await;
    assert_eq!(missing, StatusCode::NOT_FOUND);

    let (blank, _) = app
        .internal_post("/internal/users/online", json!({ "tokenIdentifier": " " }))
        .await;
    assert_eq!(blank, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn directory_reads_without_identity_are_unauthorized() {
    let app = TestApp::standard().await;
    app.provision("ada").await;

    for uri in [
        "/api/users",
        "/api/users/me",
        "/api/conversations/anything/members",
        "/api/conversations/anything/messages",
    ] {
        let (status, body) = app.get_as(uri, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body["error"], "401");
    }

    let (status, _) = app
        .send(
            Request::get("/api/users/me")
                .header(header::AUTHORIZATION, "Bearer not-a-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn tokens_signed_with_another_secret_are_rejected() {
    let app = TestApp::standard().await;
    app.provision("ada").await;

    let forged = JwtManager::new("development_secret_change_me", "huddle", "huddle-clients")
        .generate_token("ada", None, None)
        .unwrap();

    for uri in ["/api/users", "/api/users/me"] {
        let (status, _) = app
            .send(
                Request::get(uri)
                    .header(header::AUTHORIZATION, format!("Bearer {forged}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[tokio::test]
async fn list_users_excludes_caller() {
    let app = TestApp::standard().await;
    app.provision("ada").await;
    app.provision("bob").await;
    app.provision("cy").await;

    let (status, body) = app.get_as("/api/users", Some("bob")).await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|user| user["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["ada", "cy"]);
}

#[tokio::test]
async fn group_members_and_missing_conversation() {
    let app = TestApp::standard().await;
    let ada = app.provision("ada").await;
    app.provision("bob").await;
    let cy = app.provision("cy").await;

    let conversation_id = app
        .conversation(vec![
            cy["id"].as_str().unwrap().to_string(),
            ada["id"].as_str().unwrap().to_string(),
        ])
        .await;

    let (status, members) = app
        .get_as(
            &format!("/api/conversations/{conversation_id}/members"),
            Some("bob"),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(members, json!([ada, cy]));

    let (missing, _) = app
        .get_as("/api/conversations/missing/members", Some("bob"))
        .await;
    assert_eq!(missing, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn relay_posts_bot_reply() {
    let app = TestApp::standard().await;
    let conversation_id = app.conversation(vec!["u1".to_string()]).await;

    let (status, body) = app
        .relay_as(&conversation_id, "ada", "What is 2+2?")
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["usedFallback"], false);
    assert_eq!(body["message"]["content"], "4. That is correct.");
    assert_eq!(body["message"]["sender"], "ChatGPT");

    let (status, messages) = app
        .get_as(
            &format!("/api/conversations/{conversation_id}/messages"),
            Some("ada"),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(messages, json!([body["message"]]));
}

#[tokio::test]
async fn relay_failure_follows_policy() {
    let fallback = TestApp::new(None, true, CompletionFailurePolicy::Fallback).await;
    let conversation_id = fallback.conversation(vec!["u1".to_string()]).await;
    let (status, body) = fallback.relay_as(&conversation_id, "ada", "hello").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["usedFallback"], true);
    assert_eq!(body["message"]["content"], "I'm sorry, I don't understand that");

    let propagate = TestApp::new(None, true, CompletionFailurePolicy::Propagate).await;
    let conversation_id = propagate.conversation(vec!["u1".to_string()]).await;
    let (status, body) = propagate.relay_as(&conversation_id, "ada", "hello").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "502");

    let (_, messages) = propagate
        .get_as(
            &format!("/api/conversations/{conversation_id}/messages"),
            Some("ada"),
        )
        .await;
    assert_eq!(messages, json!([]));
}

#[tokio::test]
async fn relay_to_unknown_conversation_is_not_found() {
    let app = TestApp::standard().await;

    let (status, _) = app.relay_as("missing", "ada", "hello").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn openapi_document_lists_routes() {
    let app = TestApp::standard().await;

    let (status, doc) = app.get_as("/api-docs/openapi.json", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/api/users/me"].is_object());
    assert!(doc["paths"]["/api/conversations/{conversation_id}/relay"].is_object());
}

#[tokio::test]
async fn cors_preflight_does_not_allow_internal_secret_header() {
    let app = TestApp::standard().await;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::options("/internal/users")
                .header(header::ORIGIN, "https://chat.example")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(
                    header::ACCESS_CONTROL_REQUEST_HEADERS,
                    format!("content-type,{INTERNAL_SECRET_HEADER}"),
                )
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let allowed = response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_HEADERS)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    assert!(allowed.contains("authorization"), "{allowed}");
    assert!(!allowed.contains(INTERNAL_SECRET_HEADER), "{allowed}");
}
