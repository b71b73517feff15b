//! Fair-housing phrase screening for listing copy.
//!
//! [`scan`] is the synchronous, regex-only pass used for as-you-type
//! feedback. The AI crate layers a model review on top for the pre-publish
//! gate; both produce a [`ComplianceReport`].

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::ScoreSource;

pub const SEVERITY_HIGH: &str = "high";
pub const SEVERITY_MEDIUM: &str = "medium";

/// Longest text accepted for a compliance check.
pub const MAX_TEXT_LENGTH: usize = 20_000;

/// Which checks to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckMode {
    /// Regex rules only.
    #[default]
    Fast,
    /// Regex rules plus a model review.
    Full,
}

/// A single problematic phrase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceViolation {
    pub rule_id: String,
    /// Protected class the phrase discriminates on.
    pub category: String,
    /// The offending text as it appears in the input.
    pub phrase: String,
    pub severity: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplianceReport {
    pub compliant: bool,
    pub mode: CheckMode,
    pub source: ScoreSource,
    pub violations: Vec<ComplianceViolation>,
}

impl ComplianceReport {
    pub fn new(mode: CheckMode, source: ScoreSource, violations: Vec<ComplianceViolation>) -> Self {
        Self {
            compliant: violations.is_empty(),
            mode,
            source,
            violations,
        }
    }
}

struct Rule {
    id: &'static str,
    category: &'static str,
    severity: &'static str,
    suggestion: &'static str,
    pattern: Regex,
}

fn rule(
    id: &'static str,
    category: &'static str,
    severity: &'static str,
    pattern: &str,
    suggestion: &'static str,
) -> Rule {
    Rule {
        id,
        category,
        severity,
        suggestion,
        pattern: Regex::new(pattern).expect("valid regex"),
    }
}

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        rule(
            "familial_no_children",
            "familial_status",
            SEVERITY_HIGH,
            r"(?i)\b(no\s+(kids|children|families)|adults?\s+only|child[- ]free)\b",
            "Describe the property, not who may live there.",
        ),
        rule(
            "familial_ideal_for",
            "familial_status",
            SEVERITY_MEDIUM,
            r"(?i)\b(perfect|ideal)\s+for\s+(a\s+)?(single|couple|bachelor)s?\b",
            "Describe features (e.g. 'one bedroom') instead of the ideal occupant.",
        ),
        rule(
            "religion_preference",
            "religion",
            SEVERITY_HIGH,
            r"(?i)\b(christian|muslim|jewish|hindu|catholic)s?\s+(only|preferred|wanted)\b",
            "Remove religious preferences.",
        ),
        rule(
            "origin_preference",
            "national_origin",
            SEVERITY_HIGH,
            r"(?i)\b(english\s+speakers?|no\s+immigrants|citizens?)\s+only\b|\bno\s+immigrants\b",
            "Remove language, citizenship and origin requirements.",
        ),
        rule(
            "race_preference",
            "race",
            SEVERITY_HIGH,
            r"(?i)\b(white|black|asian|hispanic|latino)s?\s+(only|preferred)\b",
            "Remove racial preferences.",
        ),
        rule(
            "disability_exclusion",
            "disability",
            SEVERITY_HIGH,
            r"(?i)\b(no\s+wheelchairs?|able[- ]bodied|no\s+(service|assistance|support)\s+animals|mentally\s+ill)\b",
            "Remove disability exclusions; assistance animals must be accommodated.",
        ),
        rule(
            "sex_preference",
            "sex",
            SEVERITY_MEDIUM,
            r"(?i)\b(male|female|men|women)\s+only\b",
            "Gender restrictions are only lawful for shared living space; state the shared-space reason.",
        ),
        rule(
            "income_source",
            "source_of_income",
            SEVERITY_HIGH,
            r"(?i)\bno\s+(section\s*8|vouchers?|housing\s+assistance)\b",
            "Remove source-of-income exclusions.",
        ),
        rule(
            "age_preference",
            "age",
            SEVERITY_MEDIUM,
            r"(?i)\b(no\s+seniors|young\s+professionals?\s+only|students?\s+only)\b",
            "Remove age-based preferences.",
        ),
    ]
});

/// Run every regex rule over `text` and collect violations in rule order.
pub fn scan(text: &str) -> Vec<ComplianceViolation> {
    let mut violations = Vec::new();
    for rule in RULES.iter() {
        for m in rule.pattern.find_iter(text) {
            violations.push(ComplianceViolation {
                rule_id: rule.id.to_string(),
                category: rule.category.to_string(),
                phrase: m.as_str().to_string(),
                severity: rule.severity.to_string(),
                suggestion: rule.suggestion.to_string(),
            });
        }
    }
    violations
}

/// The fast, regex-only check.
pub fn check_fast(text: &str) -> ComplianceReport {
    ComplianceReport::new(CheckMode::Fast, ScoreSource::Rules, scan(text))
}

/// Reject empty or oversized input before any check runs.
pub fn validate_text(text: &str) -> Result<(), CoreError> {
    if text.trim().is_empty() {
        return Err(CoreError::Validation(
            "Text to check must not be empty".to_string(),
        ));
    }
    if text.chars().count() > MAX_TEXT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Text exceeds maximum length of {MAX_TEXT_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Merge model-reported violations into the rule-based list.
///
/// A model violation whose phrase (case-insensitive) already matched a rule
/// is dropped so the same wording is not reported twice.
pub fn merge_violations(
    mut rules: Vec<ComplianceViolation>,
    model: Vec<ComplianceViolation>,
) -> Vec<ComplianceViolation> {
    for candidate in model {
        let phrase = candidate.phrase.to_lowercase();
        let duplicate = rules.iter().any(|v| {
            let existing = v.phrase.to_lowercase();
            existing.contains(&phrase) || phrase.contains(&existing)
        });
        if !duplicate {
            rules.push(candidate);
        }
    }
    rules
}
