//! Full compliance check: regex rules plus a model review.

use homestead_core::compliance::{
    check_fast, merge_violations, scan, validate_text, CheckMode, ComplianceReport,
    ComplianceViolation, SEVERITY_HIGH, SEVERITY_MEDIUM,
};
use homestead_core::error::CoreError;
use homestead_core::types::ScoreSource;
use serde::Deserialize;

use crate::client::{complete_json, TextGenerator};

/// Rule id attached to violations reported by the model.
pub const MODEL_RULE_ID: &str = "model_review";

const SYSTEM_PROMPT: &str = "You check rental listing copy for fair-housing violations: \
wording that states a preference for or against tenants by race, colour, religion, sex, \
national origin, familial status, disability, age or source of income. \
Answer with a JSON object: {\"violations\": [{\"phrase\": <exact text>, \"category\": <protected class>, \
\"severity\": \"high\"|\"medium\", \"suggestion\": <neutral rewrite>}]}. \
Return an empty list when the text is fine.";

#[derive(Debug, Deserialize)]
struct ModelReview {
    #[serde(default)]
    violations: Vec<ModelViolation>,
}

#[derive(Debug, Deserialize)]
struct ModelViolation {
    phrase: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    severity: Option<String>,
    #[serde(default)]
    suggestion: Option<String>,
}

impl ModelViolation {
    fn into_violation(self) -> Option<ComplianceViolation> {
        let phrase = self.phrase.trim().to_string();
        if phrase.is_empty() {
            return None;
        }
        let severity = match self.severity.as_deref().map(str::to_lowercase).as_deref() {
            Some(SEVERITY_HIGH) => SEVERITY_HIGH,
            _ => SEVERITY_MEDIUM,
        };
        Some(ComplianceViolation {
            rule_id: MODEL_RULE_ID.to_string(),
            category: self.category.unwrap_or_else(|| "other".to_string()),
            phrase,
            severity: severity.to_string(),
            suggestion: self
                .suggestion
                .unwrap_or_else(|| "Describe the property, not the tenant.".to_string()),
        })
    }
}

/// Check `text` in the requested mode.
///
/// `Fast` never calls the model. `Full` calls it when configured and falls
/// back to the rule result on any failure.
pub async fn check(
    generator: Option<&dyn TextGenerator>,
    text: &str,
    mode: CheckMode,
) -> Result<ComplianceReport, CoreError> {
    validate_text(text)?;

    if mode == CheckMode::Fast {
        return Ok(check_fast(text));
    }

    let rules = scan(text);
    let Some(generator) = generator else {
        return Ok(ComplianceReport::new(CheckMode::Full, ScoreSource::Rules, rules));
    };

    match complete_json::<ModelReview>(generator, SYSTEM_PROMPT, text).await {
        Ok(review) => {
            let model = review
                .violations
                .into_iter()
                .filter_map(ModelViolation::into_violation)
                .collect();
            Ok(ComplianceReport::new(
                CheckMode::Full,
                ScoreSource::Combined,
                merge_violations(rules, model),
            ))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Compliance model failed, using rules only");
            Ok(ComplianceReport::new(CheckMode::Full, ScoreSource::Rules, rules))
        }
    }
}
