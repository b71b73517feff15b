//! The caller's own profile.

use axum::extract::State;
use axum::Json;
use homestead_core::audit::{actions, entities};
use homestead_core::sanitize::{normalize_phone, sanitize_optional};
use homestead_db::models::profile::{Profile, UpsertProfile};
use homestead_db::repositories::ProfileRepo;
use serde_json::json;

use crate::audit;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Longest accepted display name.
const MAX_FULL_NAME_LENGTH: usize = 200;

/// GET /api/v1/me
pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Profile>>> {
    // Profiles are keyed by UUID, so a missing row is reported as RowNotFound.
    let profile = ProfileRepo::find_by_id(&state.pool, user.user_id)
        .await?
        .ok_or(AppError::Database(sqlx::Error::RowNotFound))?;
    Ok(Json(DataResponse { data: profile }))
}

/// PUT /api/v1/me
///
/// The stored role always comes from the token, never the body.
pub async fn upsert(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<UpsertProfile>,
) -> AppResult<Json<DataResponse<Profile>>> {
    let full_name = sanitize_optional(input.full_name.as_deref());
    if full_name
        .as_ref()
        .is_some_and(|n| n.chars().count() > MAX_FULL_NAME_LENGTH)
    {
        return Err(AppError::BadRequest(format!(
            "full_name exceeds maximum length of {MAX_FULL_NAME_LENGTH} characters"
        )));
    }
    let phone = input
        .phone
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .map(normalize_phone)
        .transpose()?;

    let clean = UpsertProfile { full_name, phone };
    let profile = ProfileRepo::upsert(&state.pool, user.user_id, &user.role, &clean).await?;

    audit::record(
        &state.pool,
        user.user_id,
        actions::PROFILE_UPDATE,
        entities::PROFILE,
        None,
        json!({ "full_name": profile.full_name, "phone": profile.phone }),
    )
    .await;

    Ok(Json(DataResponse { data: profile }))
}
