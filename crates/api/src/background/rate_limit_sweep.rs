//! Periodic removal of expired rate-limit windows.

use std::sync::Arc;
use std::time::Duration;

use homestead_core::rate_limit::RateLimiter;
use tokio_util::sync::CancellationToken;

/// How often the sweep runs.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// Run the sweep loop until `cancel` fires.
pub async fn run(limiter: Arc<RateLimiter>, cancel: CancellationToken) {
    run_every(limiter, SWEEP_INTERVAL, cancel).await;
}

/// [`run`] with a custom period.
pub async fn run_every(limiter: Arc<RateLimiter>, period: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = period.as_secs(), "Rate-limit sweep started");

    let mut interval = tokio::time::interval(period);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Rate-limit sweep stopping");
                break;
            }
            _ = interval.tick() => {
                let purged = limiter.purge_expired();
                if purged > 0 {
                    tracing::debug!(purged, remaining = limiter.len(), "Purged expired rate-limit windows");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use homestead_core::rate_limit::{policies, ManualClock};

    use super::*;

    #[tokio::test]
    async fn sweep_purges_expired_windows_and_stops_on_cancel() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let limiter = Arc::new(RateLimiter::with_clock(clock.clone()));
        limiter.check("1.2.3.4", &policies::GENERAL);
        clock.advance(chrono::Duration::minutes(2));

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_every(
            Arc::clone(&limiter),
            Duration::from_millis(10),
            cancel.clone(),
        ));

        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
        handle.await.unwrap();

        assert!(limiter.is_empty());
    }
}
