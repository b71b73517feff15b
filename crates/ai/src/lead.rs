//! Lead qualification: rule score averaged with a model score.

use homestead_core::lead::{score_lead, temperature_for, LeadSignals};
use homestead_core::types::ScoreSource;
use serde::{Deserialize, Serialize};

use crate::client::{complete_json, TextGenerator};

const SYSTEM_PROMPT: &str = "You qualify rental enquiries for a property manager. \
Rate how likely the person is to sign a lease soon, from 0 (not at all) to 100 (ready now). \
Answer with a JSON object: {\"score\": <integer 0-100>, \"reasons\": [<short strings>], \
\"summary\": <one sentence>}.";

/// Persisted as `leads.qualification_json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadQualification {
    pub score: u8,
    pub temperature: &'static str,
    pub source: ScoreSource,
    pub rule_score: u8,
    pub model_score: Option<u8>,
    pub reasons: Vec<String>,
    pub summary: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelVerdict {
    score: f64,
    #[serde(default)]
    reasons: Vec<String>,
    summary: Option<String>,
}

fn describe(signals: &LeadSignals<'_>) -> String {
    let mut lines = vec![format!("Channel: {}", signals.source)];
    lines.push(format!(
        "Contact: email={}, phone={}",
        signals.has_email, signals.has_phone
    ));
    if let Some(budget) = signals.budget_cents {
        lines.push(format!("Monthly budget: {:.2}", budget as f64 / 100.0));
    }
    if let Some(rent) = signals.property_rent_cents {
        lines.push(format!("Asking rent: {:.2}", rent as f64 / 100.0));
    }
    if let Some(date) = signals.move_in_date {
        lines.push(format!("Move-in date: {date} (today is {})", signals.today));
    }
    if let Some(message) = signals.message {
        lines.push(format!("Message: {message}"));
    }
    lines.join("\n")
}

/// Clamp a model-reported score into `0..=100`.
pub(crate) fn clamp_score(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, 100.0) as u8
}

/// Average of the rule and model scores, rounded half up.
fn average(rule: u8, model: u8) -> u8 {
    ((u16::from(rule) + u16::from(model) + 1) / 2) as u8
}

/// Score a lead. Falls back to the rule score when the model is absent or
/// misbehaves.
pub async fn qualify(
    generator: Option<&dyn TextGenerator>,
    signals: &LeadSignals<'_>,
) -> LeadQualification {
    let rules = score_lead(signals);
    let rules_only = LeadQualification {
        score: rules.score,
        temperature: rules.temperature,
        source: ScoreSource::Rules,
        rule_score: rules.score,
        model_score: None,
        reasons: rules.reasons.clone(),
        summary: None,
    };

    let Some(generator) = generator else {
        return rules_only;
    };

    match complete_json::<ModelVerdict>(generator, SYSTEM_PROMPT, &describe(signals)).await {
        Ok(verdict) => {
            let model_score = clamp_score(verdict.score);
            let score = average(rules.score, model_score);
            let mut reasons = rules.reasons;
            for reason in verdict.reasons {
                if !reasons.contains(&reason) {
                    reasons.push(reason);
                }
            }
            LeadQualification {
                score,
                temperature: temperature_for(score),
                source: ScoreSource::Combined,
                rule_score: rules.score,
                model_score: Some(model_score),
                reasons,
                summary: verdict.summary,
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Lead qualification model failed, using rules only");
            rules_only
        }
    }
}
