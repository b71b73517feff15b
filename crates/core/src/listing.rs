//! Rental property listing rules: statuses, types and field validation.

use crate::error::CoreError;
use crate::types::Cents;

// ---------------------------------------------------------------------------
// Status constants
// ---------------------------------------------------------------------------

/// Created but not visible to the public.
pub const STATUS_DRAFT: &str = "draft";
/// Passed the compliance gate and is publicly listed.
pub const STATUS_PUBLISHED: &str = "published";
/// Withdrawn by the owner or an admin.
pub const STATUS_ARCHIVED: &str = "archived";

pub const VALID_STATUSES: &[&str] = &[STATUS_DRAFT, STATUS_PUBLISHED, STATUS_ARCHIVED];

pub const PROPERTY_TYPES: &[&str] = &["apartment", "house", "room", "studio", "townhouse"];

// ---------------------------------------------------------------------------
// Validation constants
// ---------------------------------------------------------------------------

pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_DESCRIPTION_LENGTH: usize = 10_000;
pub const MAX_ADDRESS_LENGTH: usize = 500;
pub const MAX_CITY_LENGTH: usize = 100;
pub const MAX_ROOMS: i32 = 20;
/// One million per month, in cents.
pub const MAX_MONTHLY_RENT_CENTS: Cents = 100_000_000;

// ---------------------------------------------------------------------------
// Status transitions
// ---------------------------------------------------------------------------

/// - `draft`     -> `published`, `archived`
/// - `published` -> `draft`, `archived`
/// - `archived`  -> `draft`
pub fn valid_transitions(from_status: &str) -> &'static [&'static str] {
    match from_status {
        STATUS_DRAFT => &[STATUS_PUBLISHED, STATUS_ARCHIVED],
        STATUS_PUBLISHED => &[STATUS_DRAFT, STATUS_ARCHIVED],
        STATUS_ARCHIVED => &[STATUS_DRAFT],
        _ => &[],
    }
}

pub fn validate_transition(current: &str, next: &str) -> Result<(), CoreError> {
    let allowed = valid_transitions(current);
    if allowed.contains(&next) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Cannot transition property from '{current}' to '{next}'. Allowed transitions: {allowed:?}"
        )))
    }
}

/// Whether a listing in `status` is visible to anonymous visitors.
pub fn is_public(status: &str) -> bool {
    status == STATUS_PUBLISHED
}

// ---------------------------------------------------------------------------
// Field validation
// ---------------------------------------------------------------------------

pub fn validate_property_type(property_type: &str) -> Result<(), CoreError> {
    if PROPERTY_TYPES.contains(&property_type) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid property type '{property_type}'. Must be one of: {PROPERTY_TYPES:?}"
        )))
    }
}

pub fn validate_rent(monthly_rent_cents: Cents) -> Result<(), CoreError> {
    if monthly_rent_cents <= 0 || monthly_rent_cents > MAX_MONTHLY_RENT_CENTS {
        return Err(CoreError::Validation(format!(
            "Monthly rent must be between 1 and {MAX_MONTHLY_RENT_CENTS} cents"
        )));
    }
    Ok(())
}

pub fn validate_rooms(field: &str, count: i32) -> Result<(), CoreError> {
    if !(0..=MAX_ROOMS).contains(&count) {
        return Err(CoreError::Validation(format!(
            "{field} must be between 0 and {MAX_ROOMS}"
        )));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), CoreError> {
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(CoreError::Validation(format!(
            "Description exceeds maximum length of {MAX_DESCRIPTION_LENGTH} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_publishes_and_archives() {
        assert!(validate_transition(STATUS_DRAFT, STATUS_PUBLISHED).is_ok());
        assert!(validate_transition(STATUS_DRAFT, STATUS_ARCHIVED).is_ok());
    }

    #[test]
    fn archived_only_returns_to_draft() {
        assert!(validate_transition(STATUS_ARCHIVED, STATUS_DRAFT).is_ok());
        assert!(validate_transition(STATUS_ARCHIVED, STATUS_PUBLISHED).is_err());
    }

    #[test]
    fn only_published_is_public() {
        assert!(is_public(STATUS_PUBLISHED));
        assert!(!is_public(STATUS_DRAFT));
        assert!(!is_public(STATUS_ARCHIVED));
    }

    #[test]
    fn property_type_must_be_known() {
        assert!(validate_property_type("studio").is_ok());
        assert!(validate_property_type("castle").is_err());
    }

    #[test]
    fn rent_bounds() {
        assert!(validate_rent(150_000).is_ok());
        assert!(validate_rent(0).is_err());
        assert!(validate_rent(-1).is_err());
        assert!(validate_rent(MAX_MONTHLY_RENT_CENTS + 1).is_err());
    }

    #[test]
    fn room_bounds() {
        assert!(validate_rooms("bedrooms", 0).is_ok());
        assert!(validate_rooms("bedrooms", 21).is_err());
        assert!(validate_rooms("bathrooms", -1).is_err());
    }
}
