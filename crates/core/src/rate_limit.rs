//! In-process fixed-window rate limiting keyed by client identifier.
//!
//! Counters live in a sharded concurrent map keyed by
//! `"<label>:<client_id>"`. Each [`RateLimiter::check`] call holds the shard
//! lock for its key while it reads and updates the window, so concurrent
//! requests from the same client never observe a torn count.
//!
//! State is per process. Nothing is persisted or shared between instances.

use std::sync::{Arc, Mutex};

use dashmap::DashMap;

use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of "now" for window arithmetic.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall clock backed by [`chrono::Utc::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        chrono::Utc::now()
    }
}

/// Manually driven clock for tests. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: Arc<Mutex<Timestamp>>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            current: Arc::new(Mutex::new(start)),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: chrono::Duration) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Limit applied to one logical endpoint group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Requests allowed per window.
    pub max_requests: u32,
    /// Window length in milliseconds.
    pub window_ms: i64,
    /// Label prefixed to the client id in the counter key.
    pub identifier: &'static str,
}

impl RateLimitConfig {
    pub fn window(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.window_ms)
    }
}

/// Named limits for the endpoint groups.
pub mod policies {
    use super::RateLimitConfig;

    pub const GENERAL: RateLimitConfig = RateLimitConfig {
        max_requests: 100,
        window_ms: 60_000,
        identifier: "general",
    };

    pub const BOOKING: RateLimitConfig = RateLimitConfig {
        max_requests: 5,
        window_ms: 60_000,
        identifier: "booking",
    };

    pub const LEADS: RateLimitConfig = RateLimitConfig {
        max_requests: 10,
        window_ms: 60_000,
        identifier: "leads",
    };

    pub const AI: RateLimitConfig = RateLimitConfig {
        max_requests: 20,
        window_ms: 60_000,
        identifier: "ai",
    };

    pub const CHAT: RateLimitConfig = RateLimitConfig {
        max_requests: 30,
        window_ms: 60_000,
        identifier: "chat",
    };

    const ALL: &[RateLimitConfig] = &[GENERAL, BOOKING, LEADS, AI, CHAT];

    /// Look up a policy by label, falling back to [`GENERAL`].
    pub fn for_label(label: &str) -> RateLimitConfig {
        ALL.iter()
            .copied()
            .find(|p| p.identifier == label)
            .unwrap_or(GENERAL)
    }
}

// ---------------------------------------------------------------------------
// Limiter
// ---------------------------------------------------------------------------

/// Outcome of a single [`RateLimiter::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_at: Timestamp,
}

impl RateLimitDecision {
    /// Whole seconds until the window resets, rounded up, never below 1.
    pub fn retry_after_secs(&self, now: Timestamp) -> u64 {
        let millis = (self.reset_at - now).num_milliseconds().max(0) as u64;
        millis.div_ceil(1000).max(1)
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_at: Timestamp,
}

/// Fixed-window counter store.
pub struct RateLimiter {
    windows: DashMap<String, Window>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Limiter driven by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            windows: DashMap::new(),
            clock,
        }
    }

    /// Current time according to the limiter's clock.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Count one request from `client_id` against `config`.
    ///
    /// Starts a fresh window when none exists or the stored one has expired.
    /// Never fails.
    pub fn check(&self, client_id: &str, config: &RateLimitConfig) -> RateLimitDecision {
        let now = self.clock.now();
        let key = format!("{}:{client_id}", config.identifier);

        let mut window = self.windows.entry(key).or_insert(Window {
            count: 0,
            reset_at: now,
        });

        if now >= window.reset_at {
            let reset_at = now + config.window();
            if config.max_requests == 0 {
                *window = Window { count: 0, reset_at };
                return RateLimitDecision {
                    allowed: false,
                    remaining: 0,
                    reset_at,
                };
            }
            *window = Window { count: 1, reset_at };
            return RateLimitDecision {
                allowed: true,
                remaining: config.max_requests - 1,
                reset_at,
            };
        }

        if window.count >= config.max_requests {
            return RateLimitDecision {
                allowed: false,
                remaining: 0,
                reset_at: window.reset_at,
            };
        }

        window.count += 1;
        RateLimitDecision {
            allowed: true,
            remaining: config.max_requests - window.count,
            reset_at: window.reset_at,
        }
    }

    /// Drop every window whose reset time has passed. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.windows.len();
        self.windows.retain(|_, w| w.reset_at > now);
        before.saturating_sub(self.windows.len())
    }

    /// Number of tracked windows.
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("windows", &self.windows.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> Timestamp {
        chrono::Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
    }

    fn limiter() -> (RateLimiter, ManualClock) {
        let clock = ManualClock::new(start());
        (RateLimiter::with_clock(Arc::new(clock.clone())), clock)
    }

    const THREE_PER_MINUTE: RateLimitConfig = RateLimitConfig {
        max_requests: 3,
        window_ms: 60_000,
        identifier: "test",
    };

    #[test]
    fn remaining_counts_down_then_rejects() {
        let (limiter, _) = limiter();

        let remaining: Vec<u32> = (0..3)
            .map(|_| {
                let d = limiter.check("1.2.3.4", &THREE_PER_MINUTE);
                assert!(d.allowed);
                d.remaining
            })
            .collect();
        assert_eq!(remaining, vec![2, 1, 0]);

        let fourth = limiter.check("1.2.3.4", &THREE_PER_MINUTE);
        assert!(!fourth.allowed);
        assert_eq!(fourth.remaining, 0);
    }

    #[test]
    fn rejection_reports_original_reset_time() {
        let (limiter, clock) = limiter();
        let first = limiter.check("c", &THREE_PER_MINUTE);
        clock.advance(chrono::Duration::seconds(10));
        limiter.check("c", &THREE_PER_MINUTE);
        limiter.check("c", &THREE_PER_MINUTE);
        let rejected = limiter.check("c", &THREE_PER_MINUTE);

        assert!(!rejected.allowed);
        assert_eq!(rejected.reset_at, first.reset_at);
        assert_eq!(rejected.retry_after_secs(clock.now()), 50);
    }

    #[test]
    fn window_expiry_starts_fresh_window() {
        let (limiter, clock) = limiter();
        for _ in 0..4 {
            limiter.check("c", &THREE_PER_MINUTE);
        }
        clock.advance(chrono::Duration::milliseconds(60_000));

        let d = limiter.check("c", &THREE_PER_MINUTE);
        assert!(d.allowed);
        assert_eq!(d.remaining, 2);
        assert_eq!(d.reset_at, clock.now() + chrono::Duration::seconds(60));
    }

    #[test]
    fn nth_request_allowed_iff_within_max() {
        let (limiter, _) = limiter();
        let config = RateLimitConfig {
            max_requests: 7,
            window_ms: 1_000,
            identifier: "n",
        };
        for n in 1..=10u32 {
            let d = limiter.check("c", &config);
            assert_eq!(d.allowed, n <= config.max_requests, "request {n}");
        }
    }

    #[test]
    fn clients_and_labels_are_isolated() {
        let (limiter, _) = limiter();
        for _ in 0..3 {
            limiter.check("a", &THREE_PER_MINUTE);
        }
        assert!(!limiter.check("a", &THREE_PER_MINUTE).allowed);
        assert!(limiter.check("b", &THREE_PER_MINUTE).allowed);

        let other_label = RateLimitConfig {
            identifier: "other",
            ..THREE_PER_MINUTE
        };
        assert!(limiter.check("a", &other_label).allowed);
    }

    #[test]
    fn zero_quota_always_rejects() {
        let (limiter, _) = limiter();
        let closed = RateLimitConfig {
            max_requests: 0,
            ..THREE_PER_MINUTE
        };
        assert!(!limiter.check("c", &closed).allowed);
        assert!(!limiter.check("c", &closed).allowed);
    }

    #[test]
    fn purge_removes_only_expired_windows() {
        let (limiter, clock) = limiter();
        limiter.check("old", &THREE_PER_MINUTE);
        clock.advance(chrono::Duration::seconds(30));
        limiter.check("new", &THREE_PER_MINUTE);
        clock.advance(chrono::Duration::seconds(31));

        assert_eq!(limiter.purge_expired(), 1);
        assert_eq!(limiter.len(), 1);
    }

    #[test]
    fn retry_after_rounds_up_and_floors_at_one() {
        let now = start();
        let d = RateLimitDecision {
            allowed: false,
            remaining: 0,
            reset_at: now + chrono::Duration::milliseconds(1_200),
        };
        assert_eq!(d.retry_after_secs(now), 2);
        assert_eq!(d.retry_after_secs(now + chrono::Duration::seconds(5)), 1);
    }

    #[test]
    fn unknown_label_falls_back_to_general() {
        assert_eq!(policies::for_label("nope"), policies::GENERAL);
        assert_eq!(policies::for_label("booking"), policies::BOOKING);
    }

    #[test]
    fn concurrent_checks_never_exceed_quota() {
        let limiter = Arc::new(RateLimiter::new());
        let config = RateLimitConfig {
            max_requests: 50,
            window_ms: 60_000,
            identifier: "race",
        };

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                std::thread::spawn(move || {
                    (0..20)
                        .filter(|_| limiter.check("same", &config).allowed)
                        .count()
                })
            })
            .collect();

        let allowed: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(allowed, 50);
    }
}
