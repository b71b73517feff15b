//! Caller identity from the `Authorization: Bearer <token>` header.

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use homestead_core::error::CoreError;
use homestead_core::roles::ROLE_ADMIN;
use homestead_core::types::UserId;

use crate::error::AppError;
use crate::state::AppState;

/// A verified caller.
///
/// Use it directly for "any logged-in user", as `Option<AuthUser>` on public
/// routes that show more to owners, or through the extractors in
/// [`super::rbac`] when a role is required.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Platform user id (`sub`).
    pub user_id: UserId,
    /// `admin`, `owner` or `customer`.
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }

    /// Whether this caller may act on a row owned by `owner_id`.
    pub fn can_act_on(&self, owner_id: UserId) -> bool {
        self.is_admin() || self.user_id == owner_id
    }
}

fn unauthorized(message: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(message.into()))
}

/// The token part of a `Bearer` header. The scheme is case-insensitive.
fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or_else(|| unauthorized("Missing Authorization header"))?
        .to_str()
        .map_err(|_| unauthorized("Authorization header is not valid text"))?;

    match header.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => Err(unauthorized(
            "Invalid Authorization format. Expected: Bearer <token>",
        )),
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = state.tokens.verify(token).map_err(|reason| {
            tracing::debug!(%reason, path = %parts.uri.path(), "Rejected access token");
            unauthorized("Invalid or expired token")
        })?;

        Ok(AuthUser {
            user_id: claims.sub,
            role: claims.role,
        })
    }
}

/// No header means an anonymous caller. A header that fails verification
/// is still a 401.
impl OptionalFromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        if !parts.headers.contains_key(AUTHORIZATION) {
            return Ok(None);
        }
        <AuthUser as FromRequestParts<AppState>>::from_request_parts(parts, state)
            .await
            .map(Some)
    }
}
