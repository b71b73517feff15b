//! Rate limiting.
//!
//! Every `/api/v1` request is charged to the `general` policy by
//! [`enforce_general`]. Endpoints with a tighter policy also take a
//! [`RateLimited<G>`] extractor, which charges `G`'s policy and hands the
//! handler the client address it was keyed on.

use std::marker::PhantomData;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use homestead_core::rate_limit::{policies, RateLimitConfig};

use crate::error::AppError;
use crate::state::AppState;

/// Identifier used when no forwarding header is present.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Best-effort client address from proxy headers.
///
/// The first entry of `X-Forwarded-For`, else `X-Real-IP`, else
/// [`UNKNOWN_CLIENT`]. These headers are caller-controlled, so the result is
/// only good for throttling and audit hints.
pub fn client_ip(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    forwarded
        .or_else(real_ip)
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}

fn charge(state: &AppState, client: &str, config: &RateLimitConfig) -> Result<u32, AppError> {
    let decision = state.limiter.check(client, config);
    if decision.allowed {
        return Ok(decision.remaining);
    }
    let retry_after_secs = decision.retry_after_secs(state.limiter.now());
    tracing::warn!(
        client,
        policy = config.identifier,
        retry_after_secs,
        "Rate limit exceeded"
    );
    Err(AppError::RateLimited { retry_after_secs })
}

/// Middleware charging the `general` policy.
pub async fn enforce_general(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let client = client_ip(request.headers());
    charge(&state, &client, &policies::GENERAL)?;
    Ok(next.run(request).await)
}

// ---------------------------------------------------------------------------
// Per-endpoint policies
// ---------------------------------------------------------------------------

/// A named policy from [`policies`].
pub trait LimitGroup: Send + Sync + 'static {
    const LABEL: &'static str;
}

pub struct Booking;
pub struct Leads;
pub struct Ai;
pub struct Chat;

impl LimitGroup for Booking {
    const LABEL: &'static str = "booking";
}

impl LimitGroup for Leads {
    const LABEL: &'static str = "leads";
}

impl LimitGroup for Ai {
    const LABEL: &'static str = "ai";
}

impl LimitGroup for Chat {
    const LABEL: &'static str = "chat";
}

/// Extractor that charges policy `G`, rejecting with 429 when exhausted.
///
/// ```ignore
/// async fn create(limit: RateLimited<Booking>, ...) -> AppResult<...> {
///     let ip = &limit.client_ip;
/// }
/// ```
pub struct RateLimited<G: LimitGroup> {
    pub client_ip: String,
    pub remaining: u32,
    _group: PhantomData<G>,
}

impl<G: LimitGroup> FromRequestParts<AppState> for RateLimited<G> {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let client_ip = client_ip(&parts.headers);
        let remaining = charge(state, &client_ip, &policies::for_label(G::LABEL))?;
        Ok(RateLimited {
            client_ip,
            remaining,
            _group: PhantomData,
        })
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn first_forwarded_entry_wins() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        headers.insert("x-real-ip", HeaderValue::from_static("10.9.9.9"));
        assert_eq!(client_ip(&headers), "203.0.113.7");
    }

    #[test]
    fn falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static(" 198.51.100.2 "));
        assert_eq!(client_ip(&headers), "198.51.100.2");
    }

    #[test]
    fn empty_forwarded_header_falls_through() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(""));
        assert_eq!(client_ip(&headers), UNKNOWN_CLIENT);
    }

    #[test]
    fn no_headers_is_unknown() {
        assert_eq!(client_ip(&HeaderMap::new()), UNKNOWN_CLIENT);
    }
}
