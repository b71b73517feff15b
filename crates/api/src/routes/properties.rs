use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{properties, slots};
use crate::state::AppState;

/// Property routes mounted at `/properties`.
///
/// ```text
/// GET    /               -> list
/// POST   /               -> create
/// GET    /mine           -> list_mine
/// GET    /{id}           -> get_by_id
/// PUT    /{id}           -> update
/// DELETE /{id}           -> archive
/// POST   /{id}/publish   -> publish
/// GET    /{id}/slots     -> slots::list_open
/// POST   /{id}/slots     -> slots::create
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(properties::list).post(properties::create))
        .route("/mine", get(properties::list_mine))
        .route(
            "/{id}",
            get(properties::get_by_id)
                .put(properties::update)
                .delete(properties::archive),
        )
        .route("/{id}/publish", post(properties::publish))
        .route("/{id}/slots", get(slots::list_open).post(slots::create))
}
