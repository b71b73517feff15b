//! Deterministic idempotency keys for booking submissions.
//!
//! A browser that retries a booking POST (double click, flaky network) must
//! land on the same row. The key is derived only from the booking's identity
//! tuple, so identical attempts always collide on the
//! `uq_bookings_idempotency_key` constraint. This module only produces the
//! candidate key; the database enforces uniqueness.

use sha2::{Digest, Sha256};

/// Literal prefix on every booking key.
pub const BOOKING_KEY_TAG: &str = "bk_";

/// Number of hex characters of the digest kept in the key.
pub const KEY_DIGEST_LEN: usize = 32;

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

/// Build the idempotency key for a booking attempt.
///
/// All inputs are treated as opaque strings and joined with `:` before
/// hashing. No time or randomness is involved.
pub fn generate_idempotency_key(
    property_id: &str,
    slot_id: &str,
    phone: &str,
    client_ip: &str,
) -> String {
    let material = format!("{property_id}:{slot_id}:{phone}:{client_ip}");
    let digest = sha256_hex(material.as_bytes());
    format!("{BOOKING_KEY_TAG}{}", &digest[..KEY_DIGEST_LEN])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_of_empty_input_is_known() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn same_tuple_gives_same_key() {
        let a = generate_idempotency_key("p1", "s1", "+15550001111", "1.2.3.4");
        let b = generate_idempotency_key("p1", "s1", "+15550001111", "1.2.3.4");
        assert_eq!(a, b);
    }

    #[test]
    fn changing_slot_changes_key() {
        let a = generate_idempotency_key("p1", "s1", "+15550001111", "1.2.3.4");
        let b = generate_idempotency_key("p1", "s2", "+15550001111", "1.2.3.4");
        assert_ne!(a, b);
    }

    #[test]
    fn every_element_participates() {
        let base = generate_idempotency_key("p1", "s1", "+15550001111", "1.2.3.4");
        assert_ne!(base, generate_idempotency_key("p2", "s1", "+15550001111", "1.2.3.4"));
        assert_ne!(base, generate_idempotency_key("p1", "s1", "+15550001112", "1.2.3.4"));
        assert_ne!(base, generate_idempotency_key("p1", "s1", "+15550001111", "1.2.3.5"));
    }

    #[test]
    fn key_has_tag_and_fixed_length() {
        let key = generate_idempotency_key("p1", "s1", "+15550001111", "1.2.3.4");
        assert!(key.starts_with(BOOKING_KEY_TAG));
        assert_eq!(key.len(), BOOKING_KEY_TAG.len() + KEY_DIGEST_LEN);
        assert!(key[BOOKING_KEY_TAG.len()..]
            .chars()
            .all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn moving_characters_between_fields_changes_key() {
        let a = generate_idempotency_key("p1", "s12", "x", "y");
        let b = generate_idempotency_key("p1s", "12", "x", "y");
        assert_ne!(a, b);
    }
}
