//! Aggregates for the admin back-office summary.

use serde::Serialize;
use sqlx::FromRow;

/// One `(label, count)` pair from a `GROUP BY` query.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: i64,
}

/// Response body for `GET /admin/stats`.
#[derive(Debug, Clone, Serialize)]
pub struct PlatformStats {
    pub properties_by_status: Vec<LabelCount>,
    pub bookings_by_status: Vec<LabelCount>,
    pub leads_by_temperature: Vec<LabelCount>,
    pub items_under_review: i64,
}
