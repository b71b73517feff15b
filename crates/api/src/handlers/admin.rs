//! Admin back-office endpoints.

use axum::extract::{Query, State};
use axum::Json;
use homestead_core::search::{clamp_limit, clamp_offset, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use homestead_db::models::audit::{AuditLog, AuditQuery};
use homestead_db::models::household_item::HouseholdItem;
use homestead_db::models::stats::PlatformStats;
use homestead_db::repositories::{AuditRepo, HouseholdItemRepo, StatsRepo};

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/admin/audit-logs
pub async fn audit_logs(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<AuditQuery>,
) -> AppResult<Json<DataResponse<Vec<AuditLog>>>> {
    let limit = clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
    let offset = clamp_offset(params.offset);
    let logs = AuditRepo::query(&state.pool, &params, limit, offset).await?;
    Ok(Json(DataResponse { data: logs }))
}

/// GET /api/v1/admin/stats
pub async fn stats(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<PlatformStats>>> {
    let stats = StatsRepo::platform_stats(&state.pool).await?;
    Ok(Json(DataResponse { data: stats }))
}

/// GET /api/v1/admin/items/review
///
/// Marketplace items held by the fraud screen, riskiest first.
pub async fn review_queue(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<HouseholdItem>>>> {
    let items = HouseholdItemRepo::list_under_review(&state.pool).await?;
    Ok(Json(DataResponse { data: items }))
}
