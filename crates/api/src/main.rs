use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use homestead_ai::{AiConfig, OpenAiClient, TextGenerator};
use homestead_api::background::rate_limit_sweep;
use homestead_api::config::ServerConfig;
use homestead_api::router::build_app_router;
use homestead_api::state::AppState;
use homestead_core::rate_limit::RateLimiter;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = config.port, "Loaded server configuration");

    let pool = connect_database().await;
    let ai = build_generator();

    let limiter = Arc::new(RateLimiter::new());
    let sweep_cancel = CancellationToken::new();
    let sweep_handle = tokio::spawn(rate_limit_sweep::run(
        Arc::clone(&limiter),
        sweep_cancel.clone(),
    ));

    let state = AppState::with_limiter(pool, config.clone(), limiter, ai);
    let app = build_app_router(state, &config);

    let addr = SocketAddr::new(
        config.host.parse().expect("HOST must be an IP address"),
        config.port,
    );
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    tracing::info!(%addr, "Homestead API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Listener closed, stopping background tasks");
    sweep_cancel.cancel();
    let grace = Duration::from_secs(config.shutdown_timeout_secs);
    if tokio::time::timeout(grace, sweep_handle).await.is_err() {
        tracing::warn!(grace_secs = config.shutdown_timeout_secs, "Rate-limit sweep did not stop in time");
    }
    tracing::info!("Shutdown complete");
}

/// `RUST_LOG` wins; otherwise debug for our crates and the HTTP layer.
/// `LOG_FORMAT=json` switches to JSON lines for log shipping.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "homestead_api=debug,homestead_ai=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    if ServerConfig::json_logs() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Connect, verify and migrate. Any failure aborts startup.
async fn connect_database() -> homestead_db::DbPool {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = homestead_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    homestead_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    homestead_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database ready, migrations applied");
    pool
}

/// The provider is optional: without it scoring falls back to rules and
/// the generation endpoints answer 503.
fn build_generator() -> Option<Arc<dyn TextGenerator>> {
    let Some(ai_config) = AiConfig::from_env() else {
        tracing::warn!("AI_API_KEY not set, AI features degraded");
        return None;
    };
    match OpenAiClient::new(ai_config) {
        Ok(client) => {
            tracing::info!(model = client.model(), "Text-generation provider configured");
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to build text-generation client, AI features degraded");
            None
        }
    }
}

/// Resolves on SIGINT, or SIGTERM on Unix. A signal that cannot be hooked
/// is logged and never fires, so the server keeps running.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Cannot listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let received = tokio::select! {
        () = interrupt => "SIGINT",
        () = terminate => "SIGTERM",
    };
    tracing::info!(signal = received, "Shutdown requested, draining connections");
}
