//! Handlers for the `/ai` endpoints.
//!
//! Compliance and fraud degrade to rules when no provider is configured.
//! Content generation and the receptionist need the provider and return 503
//! without it.

use axum::extract::State;
use axum::Json;
use homestead_ai::compliance;
use homestead_ai::content::{self, GeneratedContent, ListingFacts};
use homestead_ai::fraud::{screen, FraudReport};
use homestead_ai::receptionist::{self, ChatTurn, PropertyContext};
use homestead_core::compliance::{CheckMode, ComplianceReport};
use homestead_core::fraud::ListingSignals;
use homestead_core::lead::SOURCE_CHAT;
use homestead_core::listing::is_public;
use homestead_core::marketplace::{validate_category, validate_price, MAX_TITLE_LENGTH};
use homestead_core::sanitize::{sanitize_optional, sanitize_required};
use homestead_core::types::{Cents, DbId};
use homestead_db::repositories::PropertyRepo;
use serde::{Deserialize, Serialize};

use super::leads::{capture, LeadCapture};
use super::properties::load_owned_property;
use crate::error::AppResult;
use crate::middleware::rate_limit::{self as limits, RateLimited};
use crate::middleware::rbac::RequireOwner;
use crate::response::DataResponse;
use crate::state::AppState;

/// Name stored on leads captured from a chat.
const CHAT_LEAD_NAME: &str = "Chat visitor";

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ComplianceRequest {
    pub text: String,
    #[serde(default)]
    pub mode: CheckMode,
}

#[derive(Debug, Deserialize)]
pub struct FraudRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price_cents: Cents,
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    "other".to_string()
}

#[derive(Debug, Deserialize)]
pub struct ContentRequest {
    pub property_id: DbId,
    #[serde(default)]
    pub languages: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReceptionistRequest {
    pub messages: Vec<ChatTurn>,
    #[serde(default)]
    pub property_id: Option<DbId>,
}

#[derive(Debug, Serialize)]
pub struct ReceptionistResponse {
    pub reply: String,
    pub fallback: bool,
    /// Set when the visitor left contact details and a lead was recorded.
    pub lead_id: Option<DbId>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/ai/compliance
pub async fn check_compliance(
    State(state): State<AppState>,
    _limit: RateLimited<limits::Ai>,
    Json(input): Json<ComplianceRequest>,
) -> AppResult<Json<DataResponse<ComplianceReport>>> {
    let report = compliance::check(state.ai(), &input.text, input.mode).await?;
    tracing::debug!(
        mode = ?report.mode,
        source = ?report.source,
        violations = report.violations.len(),
        "Compliance check"
    );
    Ok(Json(DataResponse { data: report }))
}

/// POST /api/v1/ai/fraud
pub async fn check_fraud(
    State(state): State<AppState>,
    _limit: RateLimited<limits::Ai>,
    Json(input): Json<FraudRequest>,
) -> AppResult<Json<DataResponse<FraudReport>>> {
    validate_category(&input.category)?;
    validate_price(input.price_cents)?;
    let title = sanitize_required("title", &input.title, MAX_TITLE_LENGTH)?;
    let description = sanitize_optional(input.description.as_deref()).unwrap_or_default();

    let signals = ListingSignals {
        title: &title,
        description: &description,
        price_cents: input.price_cents,
        category: &input.category,
    };
    let report = screen(state.ai(), &signals).await;
    Ok(Json(DataResponse { data: report }))
}

/// POST /api/v1/ai/content
pub async fn generate_content(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    _limit: RateLimited<limits::Ai>,
    Json(input): Json<ContentRequest>,
) -> AppResult<Json<DataResponse<GeneratedContent>>> {
    let generator = state.require_ai()?;
    let property = load_owned_property(&state, &user, input.property_id).await?;

    let facts = ListingFacts {
        title: &property.title,
        property_type: &property.property_type,
        city: &property.city,
        bedrooms: property.bedrooms,
        bathrooms: property.bathrooms,
        monthly_rent_cents: property.monthly_rent_cents,
        notes: property.description.as_deref(),
    };
    let generated = content::generate(generator, &facts, &input.languages).await?;

    tracing::info!(
        property_id = property.id,
        source = ?generated.source,
        compliant = generated.compliance.compliant,
        translations = generated.translations.len(),
        "Listing content generated"
    );
    Ok(Json(DataResponse { data: generated }))
}

/// POST /api/v1/ai/receptionist
pub async fn chat(
    State(state): State<AppState>,
    _limit: RateLimited<limits::Chat>,
    Json(input): Json<ReceptionistRequest>,
) -> AppResult<Json<DataResponse<ReceptionistResponse>>> {
    let generator = state.require_ai()?;
    let turns = receptionist::prepare_turns(&input.messages)?;

    // Unknown or unlisted properties are answered without context.
    let property = match input.property_id {
        Some(id) => PropertyRepo::find_by_id(&state.pool, id)
            .await?
            .filter(|p| is_public(&p.status)),
        None => None,
    };
    let context = property.as_ref().map(|p| PropertyContext {
        title: &p.title,
        city: &p.city,
        property_type: &p.property_type,
        monthly_rent_cents: p.monthly_rent_cents,
        bedrooms: p.bedrooms,
        description: p.description.as_deref(),
    });

    let answer = receptionist::reply(generator, &turns, context.as_ref()).await;

    let mut lead_id = None;
    if let Some(contact) = answer.contact {
        let message = turns
            .iter()
            .rev()
            .find(|m| m.role == "user")
            .map(|m| m.content.clone());
        let input = LeadCapture {
            property_id: property.as_ref().map(|p| p.id),
            name: CHAT_LEAD_NAME.to_string(),
            email: contact.email,
            phone: contact.phone,
            message,
            budget_cents: None,
            move_in_date: None,
            source: SOURCE_CHAT,
        };
        match capture(&state, input).await {
            Ok(lead) => lead_id = Some(lead.id),
            Err(e) => tracing::error!(error = %e, "Failed to record chat lead"),
        }
    }

    Ok(Json(DataResponse {
        data: ReceptionistResponse {
            reply: answer.reply,
            fallback: answer.fallback,
            lead_id,
        },
    }))
}
