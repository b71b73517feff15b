//! Booking model and DTOs.

use homestead_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `bookings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Booking {
    pub id: DbId,
    pub property_id: DbId,
    pub slot_id: DbId,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub notes: Option<String>,
    pub status: String,
    pub idempotency_key: String,
    pub client_ip: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for `POST /bookings`.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingRequest {
    pub property_id: DbId,
    pub slot_id: DbId,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub notes: Option<String>,
}

/// Validated, sanitized booking ready for insertion.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub property_id: DbId,
    pub slot_id: DbId,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub notes: Option<String>,
    pub idempotency_key: String,
    pub client_ip: String,
}

/// DTO for `PUT /bookings/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct UpdateBookingStatus {
    pub status: String,
}

/// Query parameters for listing bookings.
#[derive(Debug, Default, Deserialize)]
pub struct BookingListParams {
    pub property_id: Option<DbId>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Outcome of [`crate::repositories::BookingRepo::create_idempotent`].
#[derive(Debug)]
pub enum BookingOutcome {
    /// A new row was written and the slot claimed.
    Created(Booking),
    /// The idempotency key already existed; this is the stored row.
    Duplicate(Booking),
    /// The slot was booked by someone else in the meantime.
    SlotUnavailable,
}
