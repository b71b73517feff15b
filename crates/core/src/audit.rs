//! Audit trail vocabulary and detail redaction.

/// Action names written to `audit_logs.action`.
pub mod actions {
    pub const PROPERTY_CREATE: &str = "property_create";
    pub const PROPERTY_UPDATE: &str = "property_update";
    pub const PROPERTY_PUBLISH: &str = "property_publish";
    pub const PROPERTY_ARCHIVE: &str = "property_archive";
    pub const SLOT_CREATE: &str = "slot_create";
    pub const SLOT_DELETE: &str = "slot_delete";
    pub const BOOKING_STATUS: &str = "booking_status";
    pub const LEAD_STATUS: &str = "lead_status";
    pub const LEAD_REQUALIFY: &str = "lead_requalify";
    pub const ITEM_CREATE: &str = "item_create";
    pub const ITEM_UPDATE: &str = "item_update";
    pub const ITEM_REMOVE: &str = "item_remove";
    pub const PROFILE_UPDATE: &str = "profile_update";
}

/// Entity names written to `audit_logs.entity_type`.
pub mod entities {
    pub const PROPERTY: &str = "property";
    pub const SLOT: &str = "availability_slot";
    pub const BOOKING: &str = "booking";
    pub const LEAD: &str = "lead";
    pub const ITEM: &str = "household_item";
    pub const PROFILE: &str = "profile";
}

/// Detail keys whose values are replaced before an entry is stored.
pub const SENSITIVE_FIELDS: &[&str] = &["phone", "email", "token", "secret", "authorization"];

/// Replace sensitive values anywhere in a JSON document with `"[REDACTED]"`.
pub fn redact_sensitive_fields(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => serde_json::Value::Object(
            map.iter()
                .map(|(key, val)| {
                    let lower = key.to_lowercase();
                    let redacted = if SENSITIVE_FIELDS.iter().any(|f| lower.contains(f)) {
                        serde_json::Value::String("[REDACTED]".to_string())
                    } else {
                        redact_sensitive_fields(val)
                    };
                    (key.clone(), redacted)
                })
                .collect(),
        ),
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(redact_sensitive_fields).collect())
        }
        other => other.clone(),
    }
}
