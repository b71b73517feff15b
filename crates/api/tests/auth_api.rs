//! Authentication and role checks. Every rejection here happens in an
//! extractor, before any query runs.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, get, get_auth, lazy_pool, post_json, post_json_auth, token_for,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;
use uuid::Uuid;

use homestead_api::auth::jwt::Claims;

#[tokio::test]
async fn missing_token_is_401() {
    let app = build_test_app(lazy_pool());
    let response = get(app, "/api/v1/leads").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn malformed_authorization_header_is_401() {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    let app = build_test_app(lazy_pool());
    let request = Request::builder()
        .uri("/api/v1/me")
        .header("authorization", "Token abc")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_signed_with_another_secret_is_401() {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: Uuid::new_v4(),
        role: "admin".into(),
        exp: now + 3600,
        iat: now,
        aud: None,
    };
    let forged = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"not-the-platform-secret"),
    )
    .unwrap();

    let app = build_test_app(lazy_pool());
    let response = get_auth(app, "/api/v1/admin/stats", &forged).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_token_is_401() {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: Uuid::new_v4(),
        role: "admin".into(),
        exp: now - 3600,
        iat: now - 7200,
        aud: None,
    };
    let expired = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(common::TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap();

    let app = build_test_app(lazy_pool());
    let response = get_auth(app, "/api/v1/admin/stats", &expired).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn customer_cannot_use_admin_routes() {
    let token = token_for("customer", Uuid::new_v4());

    for uri in ["/api/v1/leads", "/api/v1/admin/audit-logs", "/api/v1/admin/stats"] {
        let app = build_test_app(lazy_pool());
        let response = get_auth(app, uri, &token).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{uri}");
    }
}

#[tokio::test]
async fn owner_cannot_use_admin_routes() {
    let token = token_for("owner", Uuid::new_v4());
    let app = build_test_app(lazy_pool());
    let response = get_auth(app, "/api/v1/admin/items/review", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn customer_cannot_create_properties() {
    let token = token_for("customer", Uuid::new_v4());
    let app = build_test_app(lazy_pool());

    let body = json!({
        "title": "Loft",
        "property_type": "apartment",
        "city": "Lisbon",
        "monthly_rent_cents": 150000,
    });
    let response = post_json_auth(app, "/api/v1/properties", body, &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn marketplace_listing_requires_login() {
    let app = build_test_app(lazy_pool());
    let body = json!({
        "title": "Oak dining table",
        "category": "furniture",
        "condition": "good",
        "price_cents": 12000,
        "city": "Porto",
    });
    let response = post_json(app, "/api/v1/marketplace/items", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_with_unknown_role_is_401() {
    let app = build_test_app(lazy_pool());
    let token = token_for("superuser", Uuid::new_v4());
    let response = get_auth(app, "/api/v1/admin/stats", &token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn lowercase_bearer_scheme_is_accepted() {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    let app = build_test_app(lazy_pool());
    let token = token_for("customer", Uuid::new_v4());
    let request = Request::builder()
        .uri("/api/v1/admin/stats")
        .header("authorization", format!("bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    // Authenticated, but not an admin.
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let app = build_test_app(lazy_pool());
    let response = get(app, "/api/v1/no-such-thing").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}
