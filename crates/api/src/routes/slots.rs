use axum::routing::delete;
use axum::Router;

use crate::handlers::slots;
use crate::state::AppState;

/// Slot routes mounted at `/slots`.
///
/// ```text
/// DELETE /{id}   -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}", delete(slots::delete))
}
