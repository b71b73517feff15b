//! Handlers for viewing slots (`/properties/{id}/slots`) and deleting them (`/slots/{id}`).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use homestead_core::audit::{actions, entities};
use homestead_core::booking::validate_slot_window;
use homestead_core::error::CoreError;
use homestead_core::types::DbId;
use homestead_db::models::slot::{AvailabilitySlot, CreateSlot};
use homestead_db::repositories::SlotRepo;
use serde_json::json;

use super::properties::{ensure_visible, load_owned_property, load_property};
use crate::audit;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireOwner;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/properties/{id}/slots
///
/// Only future, unbooked slots are returned.
pub async fn list_open(
    State(state): State<AppState>,
    viewer: Option<AuthUser>,
    Path(property_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<AvailabilitySlot>>>> {
    let property = load_property(&state, property_id).await?;
    ensure_visible(&property, viewer.as_ref())?;

    let slots = SlotRepo::list_open(&state.pool, property_id, Utc::now()).await?;
    Ok(Json(DataResponse { data: slots }))
}

/// POST /api/v1/properties/{id}/slots
pub async fn create(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path(property_id): Path<DbId>,
    Json(input): Json<CreateSlot>,
) -> AppResult<(StatusCode, Json<DataResponse<AvailabilitySlot>>)> {
    load_owned_property(&state, &user, property_id).await?;
    validate_slot_window(input.starts_at, input.ends_at, Utc::now())?;

    let slot = SlotRepo::create(&state.pool, property_id, &input).await?;

    audit::record(
        &state.pool,
        user.user_id,
        actions::SLOT_CREATE,
        entities::SLOT,
        Some(slot.id),
        json!({ "property_id": property_id, "starts_at": slot.starts_at }),
    )
    .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: slot })))
}

/// DELETE /api/v1/slots/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let slot = SlotRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "AvailabilitySlot",
            id,
        }))?;
    load_owned_property(&state, &user, slot.property_id).await?;

    // The flag can flip between the read and the delete; the conditional
    // DELETE is what decides.
    if slot.is_booked || !SlotRepo::delete_unbooked(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "Slot has a booking and cannot be deleted".into(),
        )));
    }

    audit::record(
        &state.pool,
        user.user_id,
        actions::SLOT_DELETE,
        entities::SLOT,
        Some(id),
        json!({ "property_id": slot.property_id }),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}
