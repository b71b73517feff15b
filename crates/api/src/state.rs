use std::sync::Arc;

use homestead_ai::TextGenerator;
use homestead_core::rate_limit::RateLimiter;

use crate::auth::jwt::TokenVerifier;
use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};

/// Everything a handler can reach through `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub pool: homestead_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Built from `config.jwt` once, reused for every request.
    pub tokens: Arc<TokenVerifier>,
    /// Per-instance request counters, swept by a background task.
    pub limiter: Arc<RateLimiter>,
    /// Text-generation provider, absent when `AI_API_KEY` is unset.
    pub ai: Option<Arc<dyn TextGenerator>>,
}

impl AppState {
    /// State with a fresh system-clock limiter.
    pub fn new(
        pool: homestead_db::DbPool,
        config: ServerConfig,
        ai: Option<Arc<dyn TextGenerator>>,
    ) -> Self {
        Self::with_limiter(pool, config, Arc::new(RateLimiter::new()), ai)
    }

    pub fn with_limiter(
        pool: homestead_db::DbPool,
        config: ServerConfig,
        limiter: Arc<RateLimiter>,
        ai: Option<Arc<dyn TextGenerator>>,
    ) -> Self {
        Self {
            pool,
            tokens: Arc::new(TokenVerifier::new(&config.jwt)),
            config: Arc::new(config),
            limiter,
            ai,
        }
    }

    /// The provider for features that degrade to rules without it.
    pub fn ai(&self) -> Option<&dyn TextGenerator> {
        self.ai.as_deref()
    }

    /// The provider for features that cannot work without it.
    pub fn require_ai(&self) -> AppResult<&dyn TextGenerator> {
        self.ai.as_deref().ok_or_else(|| {
            AppError::ServiceUnavailable("AI features are not configured".into())
        })
    }
}
