//! Best-effort audit trail writes.
//!
//! A failed audit insert is logged and swallowed; it never fails the
//! request that triggered it.

use homestead_core::audit::redact_sensitive_fields;
use homestead_core::types::{DbId, UserId};
use homestead_db::models::audit::CreateAuditLog;
use homestead_db::repositories::AuditRepo;
use homestead_db::DbPool;

/// Append an audit entry for an authenticated action.
pub async fn record(
    pool: &DbPool,
    actor_id: UserId,
    action: &str,
    entity_type: &str,
    entity_id: Option<DbId>,
    details: serde_json::Value,
) {
    let entry = CreateAuditLog {
        actor_id: Some(actor_id),
        action: action.to_string(),
        entity_type: entity_type.to_string(),
        entity_id,
        details_json: Some(redact_sensitive_fields(&details)),
        ip_address: None,
    };

    if let Err(e) = AuditRepo::insert(pool, &entry).await {
        tracing::error!(error = %e, action, entity_type, ?entity_id, "Failed to write audit log");
    }
}
