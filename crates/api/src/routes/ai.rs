use axum::routing::post;
use axum::Router;

use crate::handlers::ai;
use crate::state::AppState;

/// AI routes mounted at `/ai`.
///
/// ```text
/// POST /compliance     -> check_compliance (ai limit)
/// POST /fraud          -> check_fraud (ai limit)
/// POST /content        -> generate_content (ai limit, owner)
/// POST /receptionist   -> chat (chat limit)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/compliance", post(ai::check_compliance))
        .route("/fraud", post(ai::check_fraud))
        .route("/content", post(ai::generate_content))
        .route("/receptionist", post(ai::chat))
}
