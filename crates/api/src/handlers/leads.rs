//! Handlers for the `/leads` resource, plus the lead capture shared with
//! bookings and the receptionist.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, Utc};
use homestead_ai::lead::{qualify, LeadQualification};
use homestead_core::audit::{actions, entities};
use homestead_core::error::CoreError;
use homestead_core::lead::{
    self, LeadSignals, MAX_MESSAGE_LENGTH, MAX_NAME_LENGTH, SOURCE_WEB,
};
use homestead_core::listing::is_public;
use homestead_core::sanitize::{
    normalize_email, normalize_phone, sanitize_optional, sanitize_required,
};
use homestead_core::search::{clamp_limit, clamp_offset, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use homestead_core::types::{Cents, DbId};
use homestead_db::models::lead::{Lead, LeadListParams, LeadRequest, NewLead, UpdateLeadStatus};
use homestead_db::repositories::{LeadRepo, PropertyRepo};
use serde_json::json;

use crate::audit;
use crate::error::{AppError, AppResult};
use crate::middleware::rate_limit::{self as limits, RateLimited};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Capture
// ---------------------------------------------------------------------------

/// A sanitized prospect ready to be scored and stored.
#[derive(Debug, Clone)]
pub(crate) struct LeadCapture {
    pub property_id: Option<DbId>,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub budget_cents: Option<Cents>,
    pub move_in_date: Option<NaiveDate>,
    pub source: &'static str,
}

async fn property_rent(state: &AppState, property_id: Option<DbId>) -> AppResult<Option<Cents>> {
    let Some(id) = property_id else {
        return Ok(None);
    };
    Ok(PropertyRepo::find_by_id(&state.pool, id)
        .await?
        .map(|p| p.monthly_rent_cents))
}

/// Fill in the property's rent and run the qualifier.
async fn run_qualification(
    state: &AppState,
    property_id: Option<DbId>,
    mut signals: LeadSignals<'_>,
) -> AppResult<LeadQualification> {
    signals.property_rent_cents = property_rent(state, property_id).await?;
    Ok(qualify(state.ai(), &signals).await)
}

/// Score and persist a lead.
pub(crate) async fn capture(state: &AppState, input: LeadCapture) -> AppResult<Lead> {
    let signals = LeadSignals {
        message: input.message.as_deref(),
        has_email: input.email.is_some(),
        has_phone: input.phone.is_some(),
        budget_cents: input.budget_cents,
        property_rent_cents: None,
        move_in_date: input.move_in_date,
        source: input.source,
        today: Utc::now().date_naive(),
    };
    let qualification = run_qualification(state, input.property_id, signals).await?;

    let new_lead = NewLead {
        property_id: input.property_id,
        name: input.name,
        email: input.email,
        phone: input.phone,
        message: input.message,
        budget_cents: input.budget_cents,
        move_in_date: input.move_in_date,
        source: input.source.to_string(),
        score: i16::from(qualification.score),
        temperature: qualification.temperature.to_string(),
        qualification_json: Some(json!(qualification)),
    };
    let lead = LeadRepo::create(&state.pool, &new_lead).await?;

    tracing::info!(
        lead_id = lead.id,
        score = lead.score,
        temperature = %lead.temperature,
        source = %lead.source,
        "Lead captured"
    );
    Ok(lead)
}

fn clean_request(input: LeadRequest) -> AppResult<LeadCapture> {
    let name = sanitize_required("name", &input.name, MAX_NAME_LENGTH)?;
    let email = input.email.as_deref().map(normalize_email).transpose()?;
    let phone = input.phone.as_deref().map(normalize_phone).transpose()?;
    if email.is_none() && phone.is_none() {
        return Err(AppError::Core(CoreError::Validation(
            "Either email or phone is required".into(),
        )));
    }

    let message = sanitize_optional(input.message.as_deref());
    if message
        .as_ref()
        .is_some_and(|m| m.chars().count() > MAX_MESSAGE_LENGTH)
    {
        return Err(AppError::Core(CoreError::Validation(format!(
            "message exceeds maximum length of {MAX_MESSAGE_LENGTH} characters"
        ))));
    }
    if input.budget_cents.is_some_and(|b| b < 0) {
        return Err(AppError::Core(CoreError::Validation(
            "budget_cents must not be negative".into(),
        )));
    }

    Ok(LeadCapture {
        property_id: input.property_id,
        name,
        email,
        phone,
        message,
        budget_cents: input.budget_cents,
        move_in_date: input.move_in_date,
        source: SOURCE_WEB,
    })
}

async fn load_lead(state: &AppState, id: DbId) -> AppResult<Lead> {
    LeadRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Lead", id }))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/leads
pub async fn create(
    State(state): State<AppState>,
    _limit: RateLimited<limits::Leads>,
    Json(input): Json<LeadRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Lead>>)> {
    let input = clean_request(input)?;

    if let Some(property_id) = input.property_id {
        let listed = PropertyRepo::find_by_id(&state.pool, property_id)
            .await?
            .is_some_and(|p| is_public(&p.status));
        if !listed {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Property",
                id: property_id,
            }));
        }
    }

    let lead = capture(&state, input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: lead })))
}

/// GET /api/v1/leads
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<LeadListParams>,
) -> AppResult<Json<DataResponse<Vec<Lead>>>> {
    if let Some(ref status) = params.status {
        lead::validate_status(status)?;
    }
    if let Some(ref temperature) = params.temperature {
        lead::validate_temperature(temperature)?;
    }

    let limit = clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
    let offset = clamp_offset(params.offset);
    let leads = LeadRepo::list(&state.pool, &params, limit, offset).await?;
    Ok(Json(DataResponse { data: leads }))
}

/// GET /api/v1/leads/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Lead>>> {
    let lead = load_lead(&state, id).await?;
    Ok(Json(DataResponse { data: lead }))
}

/// PUT /api/v1/leads/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateLeadStatus>,
) -> AppResult<Json<DataResponse<Lead>>> {
    lead::validate_status(&input.status)?;
    let current = load_lead(&state, id).await?;
    lead::validate_transition(&current.status, &input.status)?;

    let updated = LeadRepo::update_status(&state.pool, id, &input.status)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Lead", id }))?;

    audit::record(
        &state.pool,
        admin.user_id,
        actions::LEAD_STATUS,
        entities::LEAD,
        Some(id),
        json!({ "from": current.status, "to": updated.status }),
    )
    .await;

    Ok(Json(DataResponse { data: updated }))
}

/// POST /api/v1/leads/{id}/requalify
pub async fn requalify(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Lead>>> {
    let current = load_lead(&state, id).await?;

    let signals = LeadSignals {
        message: current.message.as_deref(),
        has_email: current.email.is_some(),
        has_phone: current.phone.is_some(),
        budget_cents: current.budget_cents,
        property_rent_cents: None,
        move_in_date: current.move_in_date,
        source: &current.source,
        today: Utc::now().date_naive(),
    };
    let qualification = run_qualification(&state, current.property_id, signals).await?;

    let updated = LeadRepo::update_qualification(
        &state.pool,
        id,
        i16::from(qualification.score),
        qualification.temperature,
        &json!(qualification),
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound { entity: "Lead", id }))?;

    audit::record(
        &state.pool,
        admin.user_id,
        actions::LEAD_REQUALIFY,
        entities::LEAD,
        Some(id),
        json!({
            "previous_score": current.score,
            "score": updated.score,
            "source": qualification.source,
        }),
    )
    .await;

    Ok(Json(DataResponse { data: updated }))
}
