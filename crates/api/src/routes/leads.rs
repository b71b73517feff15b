use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::leads;
use crate::state::AppState;

/// Lead routes mounted at `/leads`.
///
/// Everything except `POST /` requires the `admin` role.
///
/// ```text
/// POST /                  -> create (public, leads limit)
/// GET  /                  -> list
/// GET  /{id}              -> get_by_id
/// PUT  /{id}/status       -> update_status
/// POST /{id}/requalify    -> requalify
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(leads::list).post(leads::create))
        .route("/{id}", get(leads::get_by_id))
        .route("/{id}/status", put(leads::update_status))
        .route("/{id}/requalify", post(leads::requalify))
}
