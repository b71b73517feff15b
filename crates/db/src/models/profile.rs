//! Profile model and DTOs.

use homestead_core::types::{Timestamp, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `profiles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Profile {
    pub id: UserId,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub role: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for `PUT /me`. The role is never user-editable.
#[derive(Debug, Deserialize)]
pub struct UpsertProfile {
    pub full_name: Option<String>,
    pub phone: Option<String>,
}
