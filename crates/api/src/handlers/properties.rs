//! Handlers for the `/properties` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use homestead_ai::compliance;
use homestead_core::audit::{actions, entities};
use homestead_core::compliance::CheckMode;
use homestead_core::error::CoreError;
use homestead_core::listing::{
    self, is_public, validate_description, validate_property_type, validate_rent,
    validate_rooms, MAX_ADDRESS_LENGTH, MAX_CITY_LENGTH, MAX_TITLE_LENGTH, STATUS_ARCHIVED,
    STATUS_PUBLISHED,
};
use homestead_core::sanitize::{sanitize_optional, sanitize_required};
use homestead_core::search::{clamp_limit, clamp_offset, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use homestead_core::types::DbId;
use homestead_db::models::property::{CreateProperty, Property, PropertyListParams, UpdateProperty};
use homestead_db::repositories::PropertyRepo;
use serde_json::json;

use crate::audit;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireOwner;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) async fn load_property(state: &AppState, id: DbId) -> AppResult<Property> {
    PropertyRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Property",
            id,
        }))
}

/// Load a property the caller must own (or be admin for).
pub(crate) async fn load_owned_property(
    state: &AppState,
    user: &AuthUser,
    id: DbId,
) -> AppResult<Property> {
    let property = load_property(state, id).await?;
    if !user.can_act_on(property.owner_id) {
        return Err(AppError::Core(CoreError::Forbidden(
            "You do not manage this property".into(),
        )));
    }
    Ok(property)
}

/// Hide non-public listings from everyone but their owner and admins.
pub(crate) fn ensure_visible(property: &Property, viewer: Option<&AuthUser>) -> AppResult<()> {
    let privileged = viewer.is_some_and(|u| u.can_act_on(property.owner_id));
    if is_public(&property.status) || privileged {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Property",
            id: property.id,
        }))
    }
}

fn clean_description(input: Option<&str>) -> AppResult<Option<String>> {
    let description = sanitize_optional(input);
    if let Some(ref d) = description {
        validate_description(d)?;
    }
    Ok(description)
}

fn clean_address(input: Option<&str>) -> AppResult<Option<String>> {
    match input {
        Some(a) => Ok(Some(sanitize_required("address", a, MAX_ADDRESS_LENGTH)?)),
        None => Ok(None),
    }
}

fn clean_create(input: CreateProperty) -> AppResult<CreateProperty> {
    validate_property_type(&input.property_type)?;
    validate_rent(input.monthly_rent_cents)?;
    validate_rooms("bedrooms", input.bedrooms)?;
    validate_rooms("bathrooms", input.bathrooms)?;

    Ok(CreateProperty {
        title: sanitize_required("title", &input.title, MAX_TITLE_LENGTH)?,
        description: clean_description(input.description.as_deref())?,
        city: sanitize_required("city", &input.city, MAX_CITY_LENGTH)?,
        address: clean_address(input.address.as_deref())?,
        ..input
    })
}

fn clean_update(input: UpdateProperty) -> AppResult<UpdateProperty> {
    if let Some(ref t) = input.property_type {
        validate_property_type(t)?;
    }
    if let Some(rent) = input.monthly_rent_cents {
        validate_rent(rent)?;
    }
    if let Some(n) = input.bedrooms {
        validate_rooms("bedrooms", n)?;
    }
    if let Some(n) = input.bathrooms {
        validate_rooms("bathrooms", n)?;
    }

    let title = match input.title.as_deref() {
        Some(t) => Some(sanitize_required("title", t, MAX_TITLE_LENGTH)?),
        None => None,
    };
    let city = match input.city.as_deref() {
        Some(c) => Some(sanitize_required("city", c, MAX_CITY_LENGTH)?),
        None => None,
    };

    Ok(UpdateProperty {
        title,
        description: clean_description(input.description.as_deref())?,
        city,
        address: clean_address(input.address.as_deref())?,
        ..input
    })
}

fn compose_listing_text(title: &str, description: Option<&str>) -> String {
    match description {
        Some(d) => format!("{title}\n\n{d}"),
        None => title.to_string(),
    }
}

/// Text screened by the compliance gate.
pub(crate) fn listing_text(property: &Property) -> String {
    compose_listing_text(&property.title, property.description.as_deref())
}

/// Run the full compliance check and turn violations into a 422.
async fn require_compliant(state: &AppState, id: DbId, text: &str, action: &str) -> AppResult<()> {
    let report = compliance::check(state.ai(), text, CheckMode::Full).await?;
    if report.compliant {
        tracing::debug!(property_id = id, action, source = ?report.source, "Compliance check passed");
        return Ok(());
    }
    tracing::info!(
        property_id = id,
        action,
        violations = report.violations.len(),
        "Blocked by compliance check"
    );
    Err(AppError::ComplianceFailed(report.violations))
}

fn changed_underneath() -> AppError {
    AppError::Core(CoreError::Conflict(
        "Property was changed by another request, reload and retry".into(),
    ))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/properties
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PropertyListParams>,
) -> AppResult<Json<DataResponse<Vec<Property>>>> {
    let limit = clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
    let offset = clamp_offset(params.offset);
    let properties = PropertyRepo::list_published(&state.pool, &params, limit, offset).await?;
    Ok(Json(DataResponse { data: properties }))
}

/// GET /api/v1/properties/mine
pub async fn list_mine(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
) -> AppResult<Json<DataResponse<Vec<Property>>>> {
    let properties = PropertyRepo::list_by_owner(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: properties }))
}

/// POST /api/v1/properties
pub async fn create(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Json(input): Json<CreateProperty>,
) -> AppResult<(StatusCode, Json<DataResponse<Property>>)> {
    let input = clean_create(input)?;
    let property = PropertyRepo::create(&state.pool, user.user_id, &input).await?;

    tracing::info!(property_id = property.id, owner_id = %user.user_id, "Property created");
    audit::record(
        &state.pool,
        user.user_id,
        actions::PROPERTY_CREATE,
        entities::PROPERTY,
        Some(property.id),
        json!({ "title": property.title, "city": property.city }),
    )
    .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: property })))
}

/// GET /api/v1/properties/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    viewer: Option<AuthUser>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Property>>> {
    let property = load_property(&state, id).await?;
    ensure_visible(&property, viewer.as_ref())?;
    Ok(Json(DataResponse { data: property }))
}

/// PUT /api/v1/properties/{id}
///
/// Copy changes to a published listing go through the same full compliance
/// check as publishing; a failing edit is refused and the live text stays.
pub async fn update(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProperty>,
) -> AppResult<Json<DataResponse<Property>>> {
    let current = load_owned_property(&state, &user, id).await?;
    let input = clean_update(input)?;

    let copy_changed = input.title.is_some() || input.description.is_some();
    let rechecked = current.status == STATUS_PUBLISHED && copy_changed;
    if rechecked {
        let text = compose_listing_text(
            input.title.as_deref().unwrap_or(&current.title),
            input.description.as_deref().or(current.description.as_deref()),
        );
        require_compliant(&state, id, &text, "update").await?;
    }

    // Guarded on the status read above, so a concurrent publish cannot
    // slip unchecked copy live.
    let property = PropertyRepo::update(&state.pool, id, &current.status, &input)
        .await?
        .ok_or_else(changed_underneath)?;

    audit::record(
        &state.pool,
        user.user_id,
        actions::PROPERTY_UPDATE,
        entities::PROPERTY,
        Some(id),
        json!({ "status": property.status, "compliance_rechecked": rechecked }),
    )
    .await;

    Ok(Json(DataResponse { data: property }))
}

/// DELETE /api/v1/properties/{id}
///
/// Archives rather than deletes so bookings and leads keep their history.
pub async fn archive(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let property = load_owned_property(&state, &user, id).await?;
    listing::validate_transition(&property.status, STATUS_ARCHIVED)?;

    PropertyRepo::transition(&state.pool, id, &property.status, STATUS_ARCHIVED)
        .await?
        .ok_or_else(changed_underneath)?;

    audit::record(
        &state.pool,
        user.user_id,
        actions::PROPERTY_ARCHIVE,
        entities::PROPERTY,
        Some(id),
        json!({ "from": property.status }),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/properties/{id}/publish
///
/// Runs the full compliance check and refuses to publish copy with open
/// violations.
pub async fn publish(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Property>>> {
    let property = load_owned_property(&state, &user, id).await?;
    listing::validate_transition(&property.status, STATUS_PUBLISHED)?;

    require_compliant(&state, id, &listing_text(&property), "publish").await?;

    // Only the revision that passed the check may go live.
    let published =
        PropertyRepo::publish_revision(&state.pool, id, &property.status, property.updated_at)
            .await?
            .ok_or_else(changed_underneath)?;

    tracing::info!(property_id = id, from = %property.status, "Property published");
    audit::record(
        &state.pool,
        user.user_id,
        actions::PROPERTY_PUBLISH,
        entities::PROPERTY,
        Some(id),
        json!({ "from": property.status }),
    )
    .await;

    Ok(Json(DataResponse { data: published }))
}
