//! Handlers for the `/bookings` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use homestead_core::audit::{actions, entities};
use homestead_core::booking::{
    self, releases_slot, MAX_NAME_LENGTH, MAX_NOTES_LENGTH,
};
use homestead_core::error::CoreError;
use homestead_core::idempotency::generate_idempotency_key;
use homestead_core::lead::SOURCE_BOOKING;
use homestead_core::listing::is_public;
use homestead_core::sanitize::{
    normalize_email, normalize_phone, sanitize_optional, sanitize_required,
};
use homestead_core::search::{clamp_limit, clamp_offset, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use homestead_core::types::DbId;
use homestead_db::models::booking::{
    Booking, BookingListParams, BookingOutcome, BookingRequest, NewBooking, UpdateBookingStatus,
};
use homestead_db::repositories::{BookingRepo, PropertyRepo};
use serde_json::json;

use super::leads::{capture, LeadCapture};
use super::properties::load_owned_property;
use crate::audit;
use crate::error::{AppError, AppResult};
use crate::middleware::rate_limit::{self as limits, RateLimited};
use crate::middleware::rbac::RequireOwner;
use crate::response::DataResponse;
use crate::state::AppState;

/// Sanitized booking fields, before the key is attached.
struct CleanBooking {
    customer_name: String,
    customer_phone: String,
    customer_email: Option<String>,
    notes: Option<String>,
}

fn clean_request(input: &BookingRequest) -> AppResult<CleanBooking> {
    let customer_name = sanitize_required("customer_name", &input.customer_name, MAX_NAME_LENGTH)?;
    let customer_phone = normalize_phone(&input.customer_phone)?;
    let customer_email = input
        .customer_email
        .as_deref()
        .filter(|e| !e.trim().is_empty())
        .map(normalize_email)
        .transpose()?;

    let notes = sanitize_optional(input.notes.as_deref());
    if notes
        .as_ref()
        .is_some_and(|n| n.chars().count() > MAX_NOTES_LENGTH)
    {
        return Err(AppError::Core(CoreError::Validation(format!(
            "notes exceed maximum length of {MAX_NOTES_LENGTH} characters"
        ))));
    }

    Ok(CleanBooking {
        customer_name,
        customer_phone,
        customer_email,
        notes,
    })
}

/// Record the booking as a lead. The booking is already committed, so a
/// failure here is only logged.
async fn capture_booking_lead(state: &AppState, booking: &Booking) {
    let input = LeadCapture {
        property_id: Some(booking.property_id),
        name: booking.customer_name.clone(),
        email: booking.customer_email.clone(),
        phone: Some(booking.customer_phone.clone()),
        message: booking.notes.clone(),
        budget_cents: None,
        move_in_date: None,
        source: SOURCE_BOOKING,
    };
    if let Err(e) = capture(state, input).await {
        tracing::error!(error = %e, booking_id = booking.id, "Failed to record booking lead");
    }
}

/// POST /api/v1/bookings
///
/// Replaying the same request returns the stored booking with 200 instead of
/// 201. A slot claimed by someone else is a 409.
pub async fn create(
    State(state): State<AppState>,
    limit: RateLimited<limits::Booking>,
    Json(input): Json<BookingRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Booking>>)> {
    let clean = clean_request(&input)?;

    let listed = PropertyRepo::find_by_id(&state.pool, input.property_id)
        .await?
        .is_some_and(|p| is_public(&p.status));
    if !listed {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Property",
            id: input.property_id,
        }));
    }

    let idempotency_key = generate_idempotency_key(
        &input.property_id.to_string(),
        &input.slot_id.to_string(),
        &clean.customer_phone,
        &limit.client_ip,
    );

    let new_booking = NewBooking {
        property_id: input.property_id,
        slot_id: input.slot_id,
        customer_name: clean.customer_name,
        customer_phone: clean.customer_phone,
        customer_email: clean.customer_email,
        notes: clean.notes,
        idempotency_key,
        client_ip: limit.client_ip,
    };

    match BookingRepo::create_idempotent(&state.pool, &new_booking).await? {
        BookingOutcome::Created(booking) => {
            tracing::info!(
                booking_id = booking.id,
                property_id = booking.property_id,
                slot_id = booking.slot_id,
                "Booking created"
            );
            capture_booking_lead(&state, &booking).await;
            Ok((StatusCode::CREATED, Json(DataResponse { data: booking })))
        }
        BookingOutcome::Duplicate(booking) => {
            tracing::debug!(booking_id = booking.id, "Duplicate booking submission");
            Ok((StatusCode::OK, Json(DataResponse { data: booking })))
        }
        BookingOutcome::SlotUnavailable => Err(AppError::Core(CoreError::Conflict(
            "This slot is no longer available".into(),
        ))),
    }
}

/// GET /api/v1/bookings
///
/// Owners see bookings on their own properties; admins see everything.
pub async fn list(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Query(params): Query<BookingListParams>,
) -> AppResult<Json<DataResponse<Vec<Booking>>>> {
    if let Some(ref status) = params.status {
        booking::validate_status(status)?;
    }

    let owner_filter = (!user.is_admin()).then_some(user.user_id);
    let limit = clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
    let offset = clamp_offset(params.offset);

    let bookings = BookingRepo::list(&state.pool, &params, owner_filter, limit, offset).await?;
    Ok(Json(DataResponse { data: bookings }))
}

/// PUT /api/v1/bookings/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateBookingStatus>,
) -> AppResult<Json<DataResponse<Booking>>> {
    booking::validate_status(&input.status)?;

    let current = BookingRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Booking",
            id,
        }))?;
    load_owned_property(&state, &user, current.property_id).await?;
    booking::validate_transition(&current.status, &input.status)?;

    let updated = BookingRepo::update_status(
        &state.pool,
        id,
        &current.status,
        &input.status,
        releases_slot(&input.status),
    )
    .await?
    .ok_or_else(|| {
        AppError::Core(CoreError::Conflict(format!(
            "Booking is no longer '{}', reload and retry",
            current.status
        )))
    })?;

    tracing::info!(booking_id = id, from = %current.status, to = %updated.status, "Booking status changed");
    audit::record(
        &state.pool,
        user.user_id,
        actions::BOOKING_STATUS,
        entities::BOOKING,
        Some(id),
        json!({ "from": current.status, "to": updated.status }),
    )
    .await;

    Ok(Json(DataResponse { data: updated }))
}
