use axum::routing::get;
use axum::Router;

use crate::handlers::marketplace;
use crate::state::AppState;

/// Household item routes mounted at `/marketplace/items`.
///
/// ```text
/// GET    /       -> list
/// POST   /       -> create
/// GET    /{id}   -> get_by_id
/// PUT    /{id}   -> update
/// DELETE /{id}   -> remove
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(marketplace::list).post(marketplace::create))
        .route(
            "/{id}",
            get(marketplace::get_by_id)
                .put(marketplace::update)
                .delete(marketplace::remove),
        )
}
