//! Booking submission: idempotent replays, slot conflicts and status
//! transitions.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{
    body_json, build_test_app, get_auth, post_auth, post_json, post_json_auth, put_json_auth,
    token_for,
};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

/// Create and publish a property with one future slot. Returns `(property_id, slot_id)`.
async fn listed_property_with_slot(app: &axum::Router, token: &str) -> (i64, i64) {
    let response = post_json_auth(
        app.clone(),
        "/api/v1/properties",
        json!({
            "title": "Garden flat",
            "description": "Ground floor with a private garden",
            "property_type": "apartment",
            "city": "Porto",
            "monthly_rent_cents": 120000,
            "bedrooms": 1,
            "bathrooms": 1,
        }),
        token,
    )
    .await;
    let property_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = post_auth(
        app.clone(),
        &format!("/api/v1/properties/{property_id}/publish"),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let start = Utc::now() + Duration::days(2);
    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/properties/{property_id}/slots"),
        json!({ "starts_at": start, "ends_at": start + Duration::minutes(30) }),
        token,
    )
    .await;
    let slot_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    (property_id, slot_id)
}

fn booking_body(property_id: i64, slot_id: i64, phone: &str) -> serde_json::Value {
    json!({
        "property_id": property_id,
        "slot_id": slot_id,
        "customer_name": "Rui <i>Costa</i>",
        "customer_phone": phone,
        "customer_email": "Rui@Example.com",
        "notes": "Can I bring my partner?",
    })
}

#[sqlx::test(migrations = "../db/migrations")]
async fn booking_claims_the_slot(pool: PgPool) {
    let app = build_test_app(pool);
    let owner = token_for("owner", Uuid::new_v4());
    let (property_id, slot_id) = listed_property_with_slot(&app, &owner).await;

    let response = post_json(
        app.clone(),
        "/api/v1/bookings",
        booking_body(property_id, slot_id, "+351 912 345 678"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "pending");
    assert_eq!(json["data"]["customer_name"], "Rui Costa");
    assert_eq!(json["data"]["customer_phone"], "+351912345678");
    assert_eq!(json["data"]["customer_email"], "rui@example.com");
    assert!(json["data"]["idempotency_key"]
        .as_str()
        .unwrap()
        .starts_with("bk_"));

    let slots = body_json(
        common::get(app, &format!("/api/v1/properties/{property_id}/slots")).await,
    )
    .await;
    assert_eq!(slots["data"].as_array().unwrap().len(), 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn replayed_booking_returns_the_stored_row(pool: PgPool) {
    let app = build_test_app(pool);
    let owner = token_for("owner", Uuid::new_v4());
    let (property_id, slot_id) = listed_property_with_slot(&app, &owner).await;
    let body = booking_body(property_id, slot_id, "+351912345678");

    let first = post_json(app.clone(), "/api/v1/bookings", body.clone()).await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let first = body_json(first).await;

    // Same phone in a different format normalizes to the same key.
    let mut replay_body = body;
    replay_body["customer_phone"] = json!("+351 912-345-678");
    let replay = post_json(app, "/api/v1/bookings", replay_body).await;
    assert_eq!(replay.status(), StatusCode::OK);
    let replay = body_json(replay).await;

    assert_eq!(first["data"]["id"], replay["data"]["id"]);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn taken_slot_is_409(pool: PgPool) {
    let app = build_test_app(pool);
    let owner = token_for("owner", Uuid::new_v4());
    let (property_id, slot_id) = listed_property_with_slot(&app, &owner).await;

    let response = post_json(
        app.clone(),
        "/api/v1/bookings",
        booking_body(property_id, slot_id, "+351912345678"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_json(
        app,
        "/api/v1/bookings",
        booking_body(property_id, slot_id, "+351900000000"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unlisted_property_cannot_be_booked(pool: PgPool) {
    let app = build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/bookings",
        booking_body(9999, 1, "+351912345678"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn booking_records_a_lead(pool: PgPool) {
    let app = build_test_app(pool);
    let owner = token_for("owner", Uuid::new_v4());
    let (property_id, slot_id) = listed_property_with_slot(&app, &owner).await;

    post_json(
        app.clone(),
        "/api/v1/bookings",
        booking_body(property_id, slot_id, "+351912345678"),
    )
    .await;

    let admin = token_for("admin", Uuid::new_v4());
    let json = body_json(get_auth(app, "/api/v1/leads", &admin).await).await;
    let leads = json["data"].as_array().unwrap();
    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0]["source"], "booking");
    assert_eq!(leads[0]["property_id"], property_id);
    assert_eq!(leads[0]["qualification_json"]["source"], "rules");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn owners_only_see_their_own_bookings(pool: PgPool) {
    let app = build_test_app(pool);
    let owner = token_for("owner", Uuid::new_v4());
    let (property_id, slot_id) = listed_property_with_slot(&app, &owner).await;
    post_json(
        app.clone(),
        "/api/v1/bookings",
        booking_body(property_id, slot_id, "+351912345678"),
    )
    .await;

    let json = body_json(get_auth(app.clone(), "/api/v1/bookings", &owner).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let other = token_for("owner", Uuid::new_v4());
    let json = body_json(get_auth(app.clone(), "/api/v1/bookings", &other).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 0);

    let admin = token_for("admin", Uuid::new_v4());
    let json = body_json(get_auth(app, "/api/v1/bookings", &admin).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn cancelling_frees_the_slot(pool: PgPool) {
    let app = build_test_app(pool);
    let owner = token_for("owner", Uuid::new_v4());
    let (property_id, slot_id) = listed_property_with_slot(&app, &owner).await;
    let response = post_json(
        app.clone(),
        "/api/v1/bookings",
        booking_body(property_id, slot_id, "+351912345678"),
    )
    .await;
    let booking_id = body_json(response).await["data"]["id"].as_i64().unwrap();
    let uri = format!("/api/v1/bookings/{booking_id}/status");

    let response = put_json_auth(app.clone(), &uri, json!({ "status": "completed" }), &owner).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = put_json_auth(app.clone(), &uri, json!({ "status": "cancelled" }), &owner).await;
    assert_eq!(response.status(), StatusCode::OK);

    let slots = body_json(
        common::get(app.clone(), &format!("/api/v1/properties/{property_id}/slots")).await,
    )
    .await;
    assert_eq!(slots["data"][0]["id"], slot_id);

    // A new customer can now take the slot.
    let response = post_json(
        app,
        "/api/v1/bookings",
        booking_body(property_id, slot_id, "+351900000000"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn racing_status_changes_apply_once(pool: PgPool) {
    let app = build_test_app(pool);
    let owner = token_for("owner", Uuid::new_v4());
    let (property_id, slot_id) = listed_property_with_slot(&app, &owner).await;
    let response = post_json(
        app.clone(),
        "/api/v1/bookings",
        booking_body(property_id, slot_id, "+351912345678"),
    )
    .await;
    let booking_id = body_json(response).await["data"]["id"].as_i64().unwrap();
    let uri = format!("/api/v1/bookings/{booking_id}/status");

    let (confirm, cancel) = tokio::join!(
        put_json_auth(app.clone(), &uri, json!({ "status": "confirmed" }), &owner),
        put_json_auth(app.clone(), &uri, json!({ "status": "cancelled" }), &owner),
    );
    let statuses = [confirm.status(), cancel.status()];
    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::OK).count(), 1);
    // The loser saw either the old status (409) or the new one (400).
    assert!(statuses
        .iter()
        .all(|s| matches!(*s, StatusCode::OK | StatusCode::CONFLICT | StatusCode::BAD_REQUEST)));

    let winner = if confirm.status() == StatusCode::OK { "confirmed" } else { "cancelled" };
    let json = body_json(get_auth(app.clone(), "/api/v1/bookings", &owner).await).await;
    assert_eq!(json["data"][0]["status"], winner);

    // A confirmed booking keeps the slot; a cancelled one frees it for exactly one taker.
    let response = post_json(
        app,
        "/api/v1/bookings",
        booking_body(property_id, slot_id, "+351900000000"),
    )
    .await;
    let expected = if winner == "cancelled" { StatusCode::CREATED } else { StatusCode::CONFLICT };
    assert_eq!(response.status(), expected);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn strangers_cannot_change_booking_status(pool: PgPool) {
    let app = build_test_app(pool);
    let owner = token_for("owner", Uuid::new_v4());
    let (property_id, slot_id) = listed_property_with_slot(&app, &owner).await;
    let response = post_json(
        app.clone(),
        "/api/v1/bookings",
        booking_body(property_id, slot_id, "+351912345678"),
    )
    .await;
    let booking_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let other = token_for("owner", Uuid::new_v4());
    let response = put_json_auth(
        app,
        &format!("/api/v1/bookings/{booking_id}/status"),
        json!({ "status": "confirmed" }),
        &other,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn booked_slot_cannot_be_deleted(pool: PgPool) {
    let app = build_test_app(pool);
    let owner = token_for("owner", Uuid::new_v4());
    let (property_id, slot_id) = listed_property_with_slot(&app, &owner).await;
    post_json(
        app.clone(),
        "/api/v1/bookings",
        booking_body(property_id, slot_id, "+351912345678"),
    )
    .await;

    let response = common::delete_auth(app, &format!("/api/v1/slots/{slot_id}"), &owner).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}
