//! Availability slot model and DTOs.

use homestead_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `availability_slots` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AvailabilitySlot {
    pub id: DbId,
    pub property_id: DbId,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    pub is_booked: bool,
    pub created_at: Timestamp,
}

/// DTO for publishing a visit window on a property.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSlot {
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
}
