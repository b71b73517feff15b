//! Rule-based fraud heuristics for marketplace listings.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::marketplace::reference_price_cents;
use crate::types::Cents;

pub const RISK_LOW: &str = "low";
pub const RISK_MEDIUM: &str = "medium";
pub const RISK_HIGH: &str = "high";

/// Score at or above which a listing is `high` risk and held for review.
pub const HIGH_RISK_THRESHOLD: u8 = 60;
/// Score at or above which a listing is `medium` risk.
pub const MEDIUM_RISK_THRESHOLD: u8 = 30;

/// Payment and contact patterns common in marketplace scams.
const SCAM_PHRASES: &[(&str, &str)] = &[
    ("wire transfer", "off_platform_payment"),
    ("western union", "off_platform_payment"),
    ("moneygram", "off_platform_payment"),
    ("gift card", "gift_card_payment"),
    ("bitcoin", "crypto_payment"),
    ("crypto", "crypto_payment"),
    ("cashier's check", "check_overpayment"),
    ("pay upfront", "advance_payment"),
    ("send money", "advance_payment"),
    ("shipping only", "no_pickup"),
    ("overseas", "seller_abroad"),
    ("whatsapp", "off_platform_contact"),
];
const SCAM_PHRASE_POINTS: i32 = 20;

const URGENCY_PHRASES: &[&str] = &["urgent", "act now", "today only", "first come"];
const URGENCY_POINTS: i32 = 10;

static CONTACT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}|\+?\d[\d\s().-]{7,}\d")
        .expect("valid regex")
});

/// Inputs to [`assess_listing`].
#[derive(Debug, Clone)]
pub struct ListingSignals<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub price_cents: Cents,
    pub category: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FraudAssessment {
    pub score: u8,
    pub risk_level: &'static str,
    /// Stable flag identifiers, deduplicated, in detection order.
    pub flags: Vec<String>,
}

impl FraudAssessment {
    /// Build an assessment from a score, deriving the risk level.
    pub fn from_score(score: u8, flags: Vec<String>) -> Self {
        Self {
            score,
            risk_level: risk_level_for(score),
            flags,
        }
    }

    pub fn requires_review(&self) -> bool {
        self.risk_level == RISK_HIGH
    }
}

pub fn risk_level_for(score: u8) -> &'static str {
    if score >= HIGH_RISK_THRESHOLD {
        RISK_HIGH
    } else if score >= MEDIUM_RISK_THRESHOLD {
        RISK_MEDIUM
    } else {
        RISK_LOW
    }
}

fn push_flag(flags: &mut Vec<String>, flag: &str) -> bool {
    if flags.iter().any(|f| f == flag) {
        return false;
    }
    flags.push(flag.to_string());
    true
}

/// Score a listing from scam phrases, urgency, embedded contact details,
/// shouting titles and implausibly low prices.
pub fn assess_listing(signals: &ListingSignals<'_>) -> FraudAssessment {
    let text = format!("{} {}", signals.title, signals.description).to_lowercase();
    let mut score = 0i32;
    let mut flags = Vec::new();

    for (phrase, flag) in SCAM_PHRASES {
        if text.contains(phrase) && push_flag(&mut flags, flag) {
            score += SCAM_PHRASE_POINTS;
        }
    }

    if URGENCY_PHRASES.iter().any(|p| text.contains(p)) {
        score += URGENCY_POINTS;
        push_flag(&mut flags, "urgency_pressure");
    }

    if CONTACT_RE.is_match(signals.description) {
        score += 10;
        push_flag(&mut flags, "contact_in_description");
    }

    let letters: Vec<char> = signals.title.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.len() >= 8 && letters.iter().all(|c| c.is_uppercase()) {
        score += 5;
        push_flag(&mut flags, "all_caps_title");
    }

    let reference = reference_price_cents(signals.category);
    if signals.price_cents > 0 && signals.price_cents * 5 < reference {
        score += 25;
        push_flag(&mut flags, "price_far_below_market");
    }

    FraudAssessment::from_score(score.clamp(0, 100) as u8, flags)
}
