//! Shared harness for API integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use async_trait::async_trait;
use homestead_ai::{AiError, ChatMessage, TextGenerator};
use homestead_api::auth::jwt::{Claims, JwtConfig};
use homestead_api::config::ServerConfig;
use homestead_api::router::build_app_router;
use homestead_api::state::AppState;

pub const TEST_JWT_SECRET: &str = "integration-test-secret-long-enough-for-hs256";

/// Forwarded address sent with every test request.
pub const TEST_CLIENT_IP: &str = "203.0.113.10";

pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        jwt: JwtConfig::new(TEST_JWT_SECRET),
    }
}

/// A pool that never connects until used. For routes that do not touch
/// the database.
pub fn lazy_pool() -> PgPool {
    PgPoolOptions::new()
        .connect_lazy("postgres://localhost/unused")
        .expect("lazy pool")
}

pub fn test_state(pool: PgPool, ai: Option<Arc<dyn TextGenerator>>) -> AppState {
    AppState::new(pool, test_config(), ai)
}

/// The production router with no text-generation provider.
pub fn build_test_app(pool: PgPool) -> Router {
    build_app_router(test_state(pool, None), &test_config())
}

/// The production router backed by `ai`.
pub fn build_test_app_with_ai(pool: PgPool, ai: Arc<dyn TextGenerator>) -> Router {
    build_app_router(test_state(pool, Some(ai)), &test_config())
}

/// Sign a token the way the identity platform would.
pub fn token_for(role: &str, user_id: Uuid) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        role: role.to_string(),
        exp: now + 3600,
        iat: now,
        aud: None,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("token encodes")
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Answers every prompt with the same text.
pub struct CannedGenerator(pub &'static str);

#[async_trait]
impl TextGenerator for CannedGenerator {
    async fn complete(&self, _: &[ChatMessage], _: bool) -> Result<String, AiError> {
        Ok(self.0.to_string())
    }
}

/// Fails every prompt as if the provider were down.
pub struct DownGenerator;

#[async_trait]
impl TextGenerator for DownGenerator {
    async fn complete(&self, _: &[ChatMessage], _: bool) -> Result<String, AiError> {
        Err(AiError::Api {
            status: 503,
            body: "provider maintenance".to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-forwarded-for", TEST_CLIENT_IP);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request builds");

    app.oneshot(request).await.expect("router is infallible")
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::DELETE, uri, Some(token), None).await
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collects")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body is JSON")
}
