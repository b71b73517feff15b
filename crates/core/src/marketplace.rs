//! Household-item marketplace rules.

use crate::error::CoreError;
use crate::types::Cents;

pub const STATUS_AVAILABLE: &str = "available";
/// Held back from the public list until an admin clears the fraud flags.
pub const STATUS_UNDER_REVIEW: &str = "under_review";
pub const STATUS_RESERVED: &str = "reserved";
pub const STATUS_SOLD: &str = "sold";
pub const STATUS_REMOVED: &str = "removed";

pub const VALID_STATUSES: &[&str] = &[
    STATUS_AVAILABLE,
    STATUS_UNDER_REVIEW,
    STATUS_RESERVED,
    STATUS_SOLD,
    STATUS_REMOVED,
];

pub const CATEGORIES: &[&str] = &[
    "furniture",
    "appliances",
    "electronics",
    "kitchen",
    "decor",
    "other",
];

pub const CONDITIONS: &[&str] = &["new", "like_new", "good", "fair"];

pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_DESCRIPTION_LENGTH: usize = 5_000;
pub const MAX_PRICE_CENTS: Cents = 10_000_000;

/// Typical asking price per category, used by the fraud heuristics to spot
/// listings priced far below market.
pub fn reference_price_cents(category: &str) -> Cents {
    match category {
        "furniture" => 15_000,
        "appliances" => 25_000,
        "electronics" => 30_000,
        "kitchen" => 5_000,
        "decor" => 3_000,
        _ => 5_000,
    }
}

/// - `available`    -> `reserved`, `sold`, `removed`
/// - `under_review` -> `available`, `removed`
/// - `reserved`     -> `available`, `sold`, `removed`
/// - `sold` and `removed` are terminal.
pub fn valid_transitions(from_status: &str) -> &'static [&'static str] {
    match from_status {
        STATUS_AVAILABLE => &[STATUS_RESERVED, STATUS_SOLD, STATUS_REMOVED],
        STATUS_UNDER_REVIEW => &[STATUS_AVAILABLE, STATUS_REMOVED],
        STATUS_RESERVED => &[STATUS_AVAILABLE, STATUS_SOLD, STATUS_REMOVED],
        _ => &[],
    }
}

pub fn validate_transition(current: &str, next: &str) -> Result<(), CoreError> {
    let allowed = valid_transitions(current);
    if allowed.contains(&next) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Cannot transition item from '{current}' to '{next}'. Allowed transitions: {allowed:?}"
        )))
    }
}

pub fn validate_category(category: &str) -> Result<(), CoreError> {
    if CATEGORIES.contains(&category) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid category '{category}'. Must be one of: {CATEGORIES:?}"
        )))
    }
}

pub fn validate_condition(condition: &str) -> Result<(), CoreError> {
    if CONDITIONS.contains(&condition) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid condition '{condition}'. Must be one of: {CONDITIONS:?}"
        )))
    }
}

/// Free items are allowed; negative prices are not.
pub fn validate_price(price_cents: Cents) -> Result<(), CoreError> {
    if !(0..=MAX_PRICE_CENTS).contains(&price_cents) {
        return Err(CoreError::Validation(format!(
            "Price must be between 0 and {MAX_PRICE_CENTS} cents"
        )));
    }
    Ok(())
}
