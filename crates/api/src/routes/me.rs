use axum::routing::get;
use axum::Router;

use crate::handlers::me;
use crate::state::AppState;

/// Profile routes mounted at `/me`.
///
/// ```text
/// GET /   -> get
/// PUT /   -> upsert
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(me::get).put(me::upsert))
}
