//! Rental property model and DTOs.

use homestead_core::types::{Cents, DbId, Timestamp, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `properties` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Property {
    pub id: DbId,
    pub owner_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub property_type: String,
    pub city: String,
    pub address: Option<String>,
    pub monthly_rent_cents: Cents,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a property. New properties always start as drafts.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProperty {
    pub title: String,
    pub description: Option<String>,
    pub property_type: String,
    pub city: String,
    pub address: Option<String>,
    pub monthly_rent_cents: Cents,
    #[serde(default)]
    pub bedrooms: i32,
    #[serde(default)]
    pub bathrooms: i32,
}

/// DTO for updating a property. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProperty {
    pub title: Option<String>,
    pub description: Option<String>,
    pub property_type: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub monthly_rent_cents: Option<Cents>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
}

/// Query parameters for the public property search.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PropertyListParams {
    pub city: Option<String>,
    pub property_type: Option<String>,
    pub min_rent_cents: Option<Cents>,
    pub max_rent_cents: Option<Cents>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
