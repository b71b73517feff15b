use std::time::Instant;

use axum::extract::State;
use axum::{routing::get, Json, Router};
use homestead_core::types::Timestamp;
use serde::Serialize;

use crate::state::AppState;

/// Liveness report for load balancers and uptime checks.
///
/// A missing text-generation provider does not degrade the status: the
/// platform runs on rules alone.
#[derive(Serialize)]
pub struct HealthReport {
    /// `ok` when the database answers, `degraded` otherwise.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Round trip of `SELECT 1`, absent when it failed.
    pub db_latency_ms: Option<u64>,
    pub ai_configured: bool,
    pub checked_at: Timestamp,
}

/// GET /health
async fn report(State(state): State<AppState>) -> Json<HealthReport> {
    let started = Instant::now();
    let db_latency_ms = match homestead_db::health_check(&state.pool).await {
        Ok(()) => Some(started.elapsed().as_millis() as u64),
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach the database");
            None
        }
    };
    let db_healthy = db_latency_ms.is_some();

    Json(HealthReport {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        db_latency_ms,
        ai_configured: state.ai.is_some(),
        checked_at: chrono::Utc::now(),
    })
}

/// Mounted at the root, outside `/api/v1` and its rate limit.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(report))
}
