//! Marketplace fraud screening: rule score combined with a model score.

use homestead_core::fraud::{assess_listing, FraudAssessment, ListingSignals};
use homestead_core::types::ScoreSource;
use serde::{Deserialize, Serialize};

use crate::client::{complete_json, TextGenerator};
use crate::lead::clamp_score;

const SYSTEM_PROMPT: &str = "You review second-hand household item listings for scams. \
Rate the fraud risk from 0 (clearly genuine) to 100 (clearly a scam). \
Answer with a JSON object: {\"score\": <integer 0-100>, \"flags\": [<snake_case identifiers>], \
\"reasoning\": <one sentence>}.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FraudReport {
    #[serde(flatten)]
    pub assessment: FraudAssessment,
    pub source: ScoreSource,
    pub rule_score: u8,
    pub model_score: Option<u8>,
    pub reasoning: Option<String>,
}

impl FraudReport {
    pub fn requires_review(&self) -> bool {
        self.assessment.requires_review()
    }
}

#[derive(Debug, Deserialize)]
struct ModelVerdict {
    score: f64,
    #[serde(default)]
    flags: Vec<String>,
    reasoning: Option<String>,
}

fn describe(signals: &ListingSignals<'_>) -> String {
    format!(
        "Category: {}\nPrice: {:.2}\nTitle: {}\nDescription: {}",
        signals.category,
        signals.price_cents as f64 / 100.0,
        signals.title,
        signals.description
    )
}

/// Score a listing. The final score is the higher of the two; flags are
/// the union in detection order.
pub async fn screen(generator: Option<&dyn TextGenerator>, signals: &ListingSignals<'_>) -> FraudReport {
    let rules = assess_listing(signals);
    let rule_score = rules.score;

    let Some(generator) = generator else {
        return FraudReport {
            assessment: rules,
            source: ScoreSource::Rules,
            rule_score,
            model_score: None,
            reasoning: None,
        };
    };

    match complete_json::<ModelVerdict>(generator, SYSTEM_PROMPT, &describe(signals)).await {
        Ok(verdict) => {
            let model_score = clamp_score(verdict.score);
            let mut flags = rules.flags;
            for flag in verdict.flags {
                let flag = flag.trim().to_lowercase();
                if !flag.is_empty() && !flags.contains(&flag) {
                    flags.push(flag);
                }
            }
            FraudReport {
                assessment: FraudAssessment::from_score(rule_score.max(model_score), flags),
                source: ScoreSource::Combined,
                rule_score,
                model_score: Some(model_score),
                reasoning: verdict.reasoning,
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Fraud model failed, using rules only");
            FraudReport {
                assessment: rules,
                source: ScoreSource::Rules,
                rule_score,
                model_score: None,
                reasoning: None,
            }
        }
    }
}
