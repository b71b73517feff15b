//! Lead model and DTOs.

use chrono::NaiveDate;
use homestead_core::types::{Cents, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `leads` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Lead {
    pub id: DbId,
    pub property_id: Option<DbId>,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub budget_cents: Option<Cents>,
    pub move_in_date: Option<NaiveDate>,
    pub source: String,
    pub score: i16,
    pub temperature: String,
    pub status: String,
    pub qualification_json: Option<serde_json::Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for `POST /leads`.
#[derive(Debug, Clone, Deserialize)]
pub struct LeadRequest {
    pub property_id: Option<DbId>,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub budget_cents: Option<Cents>,
    pub move_in_date: Option<NaiveDate>,
}

/// Validated lead plus its qualification, ready for insertion.
#[derive(Debug, Clone)]
pub struct NewLead {
    pub property_id: Option<DbId>,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub budget_cents: Option<Cents>,
    pub move_in_date: Option<NaiveDate>,
    pub source: String,
    pub score: i16,
    pub temperature: String,
    pub qualification_json: Option<serde_json::Value>,
}

/// DTO for `PUT /leads/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct UpdateLeadStatus {
    pub status: String,
}

/// Query parameters for the admin lead list.
#[derive(Debug, Default, Deserialize)]
pub struct LeadListParams {
    pub status: Option<String>,
    pub temperature: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
