//! Marketplace household item model and DTOs.

use homestead_core::types::{Cents, DbId, Timestamp, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `household_items` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct HouseholdItem {
    pub id: DbId,
    pub seller_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub condition: String,
    pub price_cents: Cents,
    pub city: String,
    pub status: String,
    pub fraud_score: i16,
    pub fraud_flags: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for listing a new item.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateHouseholdItem {
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub condition: String,
    pub price_cents: Cents,
    pub city: String,
}

/// DTO for editing an item. `status` changes go through transition checks.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateHouseholdItem {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub condition: Option<String>,
    pub price_cents: Option<Cents>,
    pub city: Option<String>,
    pub status: Option<String>,
}

/// Fraud verdict persisted with an item when it is listed or re-screened.
#[derive(Debug, Clone)]
pub struct ItemScreening {
    pub status: String,
    pub fraud_score: i16,
    pub fraud_flags: serde_json::Value,
}

/// Query parameters for the public item list.
#[derive(Debug, Default, Deserialize)]
pub struct ItemListParams {
    pub category: Option<String>,
    pub city: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
