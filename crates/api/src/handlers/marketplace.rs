//! Handlers for the `/marketplace/items` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use homestead_ai::fraud::{screen, FraudReport};
use homestead_core::audit::{actions, entities};
use homestead_core::error::CoreError;
use homestead_core::fraud::ListingSignals;
use homestead_core::listing::MAX_CITY_LENGTH;
use homestead_core::marketplace::{
    self, validate_category, validate_condition, validate_price, MAX_DESCRIPTION_LENGTH,
    MAX_TITLE_LENGTH, STATUS_AVAILABLE, STATUS_REMOVED, STATUS_UNDER_REVIEW,
};
use homestead_core::sanitize::{sanitize_optional, sanitize_required};
use homestead_core::search::{clamp_limit, clamp_offset, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use homestead_core::types::DbId;
use homestead_db::models::household_item::{
    CreateHouseholdItem, HouseholdItem, ItemListParams, ItemScreening, UpdateHouseholdItem,
};
use homestead_db::repositories::HouseholdItemRepo;
use serde_json::json;

use crate::audit;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "HouseholdItem",
        id,
    })
}

async fn load_item(state: &AppState, id: DbId) -> AppResult<HouseholdItem> {
    HouseholdItemRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))
}

async fn load_own_item(state: &AppState, user: &AuthUser, id: DbId) -> AppResult<HouseholdItem> {
    let item = load_item(state, id).await?;
    if !user.can_act_on(item.seller_id) {
        return Err(AppError::Core(CoreError::Forbidden(
            "You are not the seller of this item".into(),
        )));
    }
    Ok(item)
}

/// Items held for review or removed are hidden from the public.
fn publicly_visible(status: &str) -> bool {
    status != STATUS_UNDER_REVIEW && status != STATUS_REMOVED
}

fn clean_description(input: Option<&str>) -> AppResult<Option<String>> {
    let description = sanitize_optional(input);
    if description
        .as_ref()
        .is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LENGTH)
    {
        return Err(AppError::Core(CoreError::Validation(format!(
            "description exceeds maximum length of {MAX_DESCRIPTION_LENGTH} characters"
        ))));
    }
    Ok(description)
}

async fn screen_item(
    state: &AppState,
    title: &str,
    description: Option<&str>,
    price_cents: i64,
    category: &str,
) -> FraudReport {
    let signals = ListingSignals {
        title,
        description: description.unwrap_or_default(),
        price_cents,
        category,
    };
    screen(state.ai(), &signals).await
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/marketplace/items
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ItemListParams>,
) -> AppResult<Json<DataResponse<Vec<HouseholdItem>>>> {
    if let Some(ref category) = params.category {
        validate_category(category)?;
    }
    let limit = clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
    let offset = clamp_offset(params.offset);
    let items = HouseholdItemRepo::list_available(&state.pool, &params, limit, offset).await?;
    Ok(Json(DataResponse { data: items }))
}

/// GET /api/v1/marketplace/items/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    viewer: Option<AuthUser>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<HouseholdItem>>> {
    let item = load_item(&state, id).await?;
    let privileged = viewer.is_some_and(|u| u.can_act_on(item.seller_id));
    if !publicly_visible(&item.status) && !privileged {
        return Err(not_found(id));
    }
    Ok(Json(DataResponse { data: item }))
}

/// POST /api/v1/marketplace/items
///
/// High-risk listings are stored as `under_review` and stay hidden until an
/// admin releases them.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(input): Json<CreateHouseholdItem>,
) -> AppResult<(StatusCode, Json<DataResponse<HouseholdItem>>)> {
    validate_category(&input.category)?;
    validate_condition(&input.condition)?;
    validate_price(input.price_cents)?;

    let input = CreateHouseholdItem {
        title: sanitize_required("title", &input.title, MAX_TITLE_LENGTH)?,
        description: clean_description(input.description.as_deref())?,
        city: sanitize_required("city", &input.city, MAX_CITY_LENGTH)?,
        ..input
    };

    let report = screen_item(
        &state,
        &input.title,
        input.description.as_deref(),
        input.price_cents,
        &input.category,
    )
    .await;
    let status = if report.requires_review() {
        STATUS_UNDER_REVIEW
    } else {
        STATUS_AVAILABLE
    };
    let screening = ItemScreening {
        status: status.to_string(),
        fraud_score: i16::from(report.assessment.score),
        fraud_flags: json!(report.assessment.flags),
    };

    let item = HouseholdItemRepo::create(&state.pool, user.user_id, &input, &screening).await?;

    tracing::info!(
        item_id = item.id,
        fraud_score = item.fraud_score,
        status = %item.status,
        "Household item listed"
    );
    audit::record(
        &state.pool,
        user.user_id,
        actions::ITEM_CREATE,
        entities::ITEM,
        Some(item.id),
        json!({
            "fraud_score": report.assessment.score,
            "risk_level": report.assessment.risk_level,
            "source": report.source,
        }),
    )
    .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: item })))
}

/// PUT /api/v1/marketplace/items/{id}
///
/// Changing the title, description or price re-runs the fraud screen and
/// stores the new score and flags; a high-risk result sends the item back to
/// review.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateHouseholdItem>,
) -> AppResult<Json<DataResponse<HouseholdItem>>> {
    let current = load_own_item(&state, &user, id).await?;

    if let Some(ref category) = input.category {
        validate_category(category)?;
    }
    if let Some(ref condition) = input.condition {
        validate_condition(condition)?;
    }
    if let Some(price) = input.price_cents {
        validate_price(price)?;
    }
    if let Some(ref next) = input.status {
        marketplace::validate_transition(&current.status, next)?;
        if current.status == STATUS_UNDER_REVIEW && !user.is_admin() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Only an admin can release an item from review".into(),
            )));
        }
    }

    let title = match input.title.as_deref() {
        Some(t) => Some(sanitize_required("title", t, MAX_TITLE_LENGTH)?),
        None => None,
    };
    let city = match input.city.as_deref() {
        Some(c) => Some(sanitize_required("city", c, MAX_CITY_LENGTH)?),
        None => None,
    };
    let rescreen =
        input.title.is_some() || input.description.is_some() || input.price_cents.is_some();
    let input = UpdateHouseholdItem {
        title,
        city,
        description: clean_description(input.description.as_deref())?,
        ..input
    };

    let mut item = HouseholdItemRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;

    if let Some(ref next) = input.status {
        item = HouseholdItemRepo::set_status(&state.pool, id, next)
            .await?
            .ok_or_else(|| not_found(id))?;
    }

    if rescreen && item.status != STATUS_UNDER_REVIEW && item.status != STATUS_REMOVED {
        let report = screen_item(
            &state,
            &item.title,
            item.description.as_deref(),
            item.price_cents,
            &item.category,
        )
        .await;
        let status = if report.requires_review() {
            tracing::warn!(item_id = id, score = report.assessment.score, "Edited item sent back to review");
            STATUS_UNDER_REVIEW.to_string()
        } else {
            item.status.clone()
        };
        let screening = ItemScreening {
            status,
            fraud_score: i16::from(report.assessment.score),
            fraud_flags: json!(report.assessment.flags),
        };
        item = HouseholdItemRepo::record_screening(&state.pool, id, &screening)
            .await?
            .ok_or_else(|| not_found(id))?;
    }

    audit::record(
        &state.pool,
        user.user_id,
        actions::ITEM_UPDATE,
        entities::ITEM,
        Some(id),
        json!({ "from": current.status, "to": item.status }),
    )
    .await;

    Ok(Json(DataResponse { data: item }))
}

/// DELETE /api/v1/marketplace/items/{id}
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let item = load_own_item(&state, &user, id).await?;
    marketplace::validate_transition(&item.status, STATUS_REMOVED)?;

    HouseholdItemRepo::set_status(&state.pool, id, STATUS_REMOVED).await?;

    audit::record(
        &state.pool,
        user.user_id,
        actions::ITEM_REMOVE,
        entities::ITEM,
        Some(id),
        json!({ "from": item.status }),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}
