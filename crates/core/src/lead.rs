//! Lead lifecycle rules and rule-based qualification scoring.
//!
//! [`score_lead`] is deterministic: the same [`LeadSignals`] always produce
//! the same [`LeadScore`]. The AI crate blends this with a model opinion, and
//! falls back to it verbatim when the model is unavailable.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::CoreError;
use crate::types::Cents;

// ---------------------------------------------------------------------------
// Status, source and temperature constants
// ---------------------------------------------------------------------------

pub const STATUS_NEW: &str = "new";
pub const STATUS_CONTACTED: &str = "contacted";
pub const STATUS_QUALIFIED: &str = "qualified";
pub const STATUS_CONVERTED: &str = "converted";
pub const STATUS_LOST: &str = "lost";

pub const VALID_STATUSES: &[&str] = &[
    STATUS_NEW,
    STATUS_CONTACTED,
    STATUS_QUALIFIED,
    STATUS_CONVERTED,
    STATUS_LOST,
];

pub const SOURCE_WEB: &str = "web";
pub const SOURCE_CHAT: &str = "chat";
pub const SOURCE_BOOKING: &str = "booking";

pub const TEMPERATURE_HOT: &str = "hot";
pub const TEMPERATURE_WARM: &str = "warm";
pub const TEMPERATURE_COLD: &str = "cold";

pub const VALID_TEMPERATURES: &[&str] = &[TEMPERATURE_HOT, TEMPERATURE_WARM, TEMPERATURE_COLD];

/// Score at or above which a lead is `hot`.
pub const HOT_THRESHOLD: u8 = 70;
/// Score at or above which a lead is `warm`.
pub const WARM_THRESHOLD: u8 = 40;

pub const MAX_MESSAGE_LENGTH: usize = 5_000;
pub const MAX_NAME_LENGTH: usize = 200;

// ---------------------------------------------------------------------------
// Status transitions
// ---------------------------------------------------------------------------

/// - `new`       -> `contacted`, `lost`
/// - `contacted` -> `qualified`, `lost`
/// - `qualified` -> `converted`, `lost`
/// - `lost`      -> `contacted` (re-engaged)
/// - `converted` is terminal.
pub fn valid_transitions(from_status: &str) -> &'static [&'static str] {
    match from_status {
        STATUS_NEW => &[STATUS_CONTACTED, STATUS_LOST],
        STATUS_CONTACTED => &[STATUS_QUALIFIED, STATUS_LOST],
        STATUS_QUALIFIED => &[STATUS_CONVERTED, STATUS_LOST],
        STATUS_LOST => &[STATUS_CONTACTED],
        _ => &[],
    }
}

pub fn validate_status(status: &str) -> Result<(), CoreError> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid lead status '{status}'. Must be one of: {VALID_STATUSES:?}"
        )))
    }
}

pub fn validate_transition(current: &str, next: &str) -> Result<(), CoreError> {
    let allowed = valid_transitions(current);
    if allowed.contains(&next) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Cannot transition lead from '{current}' to '{next}'. Allowed transitions: {allowed:?}"
        )))
    }
}

pub fn validate_temperature(temperature: &str) -> Result<(), CoreError> {
    if VALID_TEMPERATURES.contains(&temperature) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid temperature '{temperature}'. Must be one of: {VALID_TEMPERATURES:?}"
        )))
    }
}

/// Bucket a 0-100 score into a temperature.
pub fn temperature_for(score: u8) -> &'static str {
    if score >= HOT_THRESHOLD {
        TEMPERATURE_HOT
    } else if score >= WARM_THRESHOLD {
        TEMPERATURE_WARM
    } else {
        TEMPERATURE_COLD
    }
}

// ---------------------------------------------------------------------------
// Rule-based scoring
// ---------------------------------------------------------------------------

const BASE_SCORE: i32 = 10;

/// Phrases that indicate the prospect is ready to act.
const INTENT_KEYWORDS: &[&str] = &[
    "ready to",
    "asap",
    "immediately",
    "this week",
    "move in",
    "viewing",
    "visit",
    "apply",
    "sign",
    "deposit",
];
const INTENT_POINTS: i32 = 5;
const INTENT_CAP: i32 = 20;

/// Phrases that indicate low commitment.
const BROWSING_KEYWORDS: &[&str] = &["just looking", "not sure", "someday", "browsing", "maybe later"];
const BROWSING_PENALTY: i32 = 10;

/// Everything the heuristics look at.
#[derive(Debug, Clone, Default)]
pub struct LeadSignals<'a> {
    pub message: Option<&'a str>,
    pub has_email: bool,
    pub has_phone: bool,
    pub budget_cents: Option<Cents>,
    /// Monthly rent of the property the lead asked about, if any.
    pub property_rent_cents: Option<Cents>,
    pub move_in_date: Option<NaiveDate>,
    pub source: &'a str,
    pub today: NaiveDate,
}

/// Result of [`score_lead`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadScore {
    pub score: u8,
    pub temperature: &'static str,
    /// Human-readable reasons, in the order they were applied.
    pub reasons: Vec<String>,
}

/// Score a lead from contact completeness, intent language, budget fit,
/// move-in urgency and capture channel.
pub fn score_lead(signals: &LeadSignals<'_>) -> LeadScore {
    let mut score = BASE_SCORE;
    let mut reasons = Vec::new();

    if signals.has_phone {
        score += 15;
        reasons.push("phone provided".to_string());
    }
    if signals.has_email {
        score += 10;
        reasons.push("email provided".to_string());
    }

    if let Some(message) = signals.message {
        let lower = message.to_lowercase();
        if message.chars().count() >= 40 {
            score += 10;
            reasons.push("detailed message".to_string());
        }

        let intent: i32 = INTENT_KEYWORDS
            .iter()
            .filter(|k| lower.contains(*k))
            .count() as i32
            * INTENT_POINTS;
        if intent > 0 {
            score += intent.min(INTENT_CAP);
            reasons.push("intent language".to_string());
        }

        let browsing = BROWSING_KEYWORDS.iter().filter(|k| lower.contains(*k)).count() as i32;
        if browsing > 0 {
            score -= browsing * BROWSING_PENALTY;
            reasons.push("browsing language".to_string());
        }
    }

    if let Some(budget) = signals.budget_cents {
        score += 10;
        reasons.push("budget stated".to_string());
        if let Some(rent) = signals.property_rent_cents.filter(|r| *r > 0) {
            if budget >= rent {
                score += 15;
                reasons.push("budget covers rent".to_string());
            } else if budget * 10 < rent * 7 {
                score -= 10;
                reasons.push("budget well below rent".to_string());
            }
        }
    }

    if let Some(move_in) = signals.move_in_date {
        let days = (move_in - signals.today).num_days();
        if (0..=30).contains(&days) {
            score += 20;
            reasons.push("moving within 30 days".to_string());
        } else if (31..=90).contains(&days) {
            score += 10;
            reasons.push("moving within 90 days".to_string());
        }
    }

    match signals.source {
        SOURCE_BOOKING => {
            score += 10;
            reasons.push("booked a visit".to_string());
        }
        SOURCE_CHAT => {
            score += 5;
            reasons.push("engaged via chat".to_string());
        }
        _ => {}
    }

    let score = score.clamp(0, 100) as u8;
    LeadScore {
        score,
        temperature: temperature_for(score),
        reasons,
    }
}
