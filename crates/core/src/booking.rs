//! Booking status rules and availability-slot validation.

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Status constants
// ---------------------------------------------------------------------------

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_CONFIRMED: &str = "confirmed";
pub const STATUS_CANCELLED: &str = "cancelled";
pub const STATUS_COMPLETED: &str = "completed";

pub const VALID_STATUSES: &[&str] = &[
    STATUS_PENDING,
    STATUS_CONFIRMED,
    STATUS_CANCELLED,
    STATUS_COMPLETED,
];

/// Longest visit window an owner may publish.
pub const MAX_SLOT_HOURS: i64 = 8;

/// Maximum length of free-text booking notes.
pub const MAX_NOTES_LENGTH: usize = 2_000;

/// Maximum length of the customer name.
pub const MAX_NAME_LENGTH: usize = 200;

// ---------------------------------------------------------------------------
// Status transitions
// ---------------------------------------------------------------------------

/// Statuses reachable from `from_status`.
///
/// - `pending`   -> `confirmed`, `cancelled`
/// - `confirmed` -> `completed`, `cancelled`
/// - `cancelled` and `completed` are terminal.
pub fn valid_transitions(from_status: &str) -> &'static [&'static str] {
    match from_status {
        STATUS_PENDING => &[STATUS_CONFIRMED, STATUS_CANCELLED],
        STATUS_CONFIRMED => &[STATUS_COMPLETED, STATUS_CANCELLED],
        _ => &[],
    }
}

pub fn validate_status(status: &str) -> Result<(), CoreError> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid booking status '{status}'. Must be one of: {VALID_STATUSES:?}"
        )))
    }
}

pub fn validate_transition(current: &str, next: &str) -> Result<(), CoreError> {
    let allowed = valid_transitions(current);
    if allowed.contains(&next) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Cannot transition booking from '{current}' to '{next}'. Allowed transitions: {allowed:?}"
        )))
    }
}

/// Whether moving into `status` should release the slot for other visitors.
pub fn releases_slot(status: &str) -> bool {
    status == STATUS_CANCELLED
}

// ---------------------------------------------------------------------------
// Slots
// ---------------------------------------------------------------------------

/// Validate a new availability slot relative to `now`.
pub fn validate_slot_window(
    starts_at: Timestamp,
    ends_at: Timestamp,
    now: Timestamp,
) -> Result<(), CoreError> {
    if ends_at <= starts_at {
        return Err(CoreError::Validation(
            "Slot end must be after its start".to_string(),
        ));
    }
    if starts_at <= now {
        return Err(CoreError::Validation(
            "Slot must start in the future".to_string(),
        ));
    }
    if ends_at - starts_at > chrono::Duration::hours(MAX_SLOT_HOURS) {
        return Err(CoreError::Validation(format!(
            "Slot may not be longer than {MAX_SLOT_HOURS} hours"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn pending_can_be_confirmed_or_cancelled() {
        assert!(validate_transition(STATUS_PENDING, STATUS_CONFIRMED).is_ok());
        assert!(validate_transition(STATUS_PENDING, STATUS_CANCELLED).is_ok());
        assert!(validate_transition(STATUS_PENDING, STATUS_COMPLETED).is_err());
    }

    #[test]
    fn confirmed_can_complete_or_cancel() {
        assert!(validate_transition(STATUS_CONFIRMED, STATUS_COMPLETED).is_ok());
        assert!(validate_transition(STATUS_CONFIRMED, STATUS_CANCELLED).is_ok());
        assert!(validate_transition(STATUS_CONFIRMED, STATUS_PENDING).is_err());
    }

    #[test]
    fn terminal_statuses_have_no_exits() {
        assert!(valid_transitions(STATUS_CANCELLED).is_empty());
        assert!(valid_transitions(STATUS_COMPLETED).is_empty());
        assert!(valid_transitions("bogus").is_empty());
    }

    #[test]
    fn only_cancellation_releases_slot() {
        assert!(releases_slot(STATUS_CANCELLED));
        assert!(!releases_slot(STATUS_COMPLETED));
        assert!(!releases_slot(STATUS_CONFIRMED));
    }

    #[test]
    fn unknown_status_rejected() {
        assert!(validate_status("maybe").is_err());
        for s in VALID_STATUSES {
            assert!(validate_status(s).is_ok());
        }
    }

    #[test]
    fn slot_window_rules() {
        let now = Utc::now();
        let start = now + Duration::hours(24);

        assert!(validate_slot_window(start, start + Duration::minutes(30), now).is_ok());
        assert!(validate_slot_window(start, start, now).is_err());
        assert!(validate_slot_window(start, start - Duration::minutes(1), now).is_err());
        assert!(validate_slot_window(now - Duration::hours(1), now + Duration::hours(1), now).is_err());
        assert!(validate_slot_window(start, start + Duration::hours(9), now).is_err());
    }
}
