use axum::routing::get;
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Admin routes mounted at `/admin`. All require the `admin` role.
///
/// ```text
/// GET /audit-logs     -> audit_logs
/// GET /stats          -> stats
/// GET /items/review   -> review_queue
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/audit-logs", get(admin::audit_logs))
        .route("/stats", get(admin::stats))
        .route("/items/review", get(admin::review_queue))
}
