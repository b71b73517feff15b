//! Role gates layered on [`AuthUser`].
//!
//! A missing or bad token is a 401 from [`AuthUser`] itself. A valid token
//! with the wrong role is a 403 here. Row ownership is the handler's job.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use homestead_core::error::CoreError;
use homestead_core::roles::{can_manage_listings, ROLE_ADMIN};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Clone, Copy)]
enum Gate {
    Admin,
    ListingManager,
    Authenticated,
}

impl Gate {
    fn permits(self, role: &str) -> bool {
        match self {
            Gate::Admin => role == ROLE_ADMIN,
            Gate::ListingManager => can_manage_listings(role),
            Gate::Authenticated => true,
        }
    }

    fn denial(self) -> &'static str {
        match self {
            Gate::Admin => "Admin role required",
            Gate::ListingManager => "Owner or Admin role required",
            Gate::Authenticated => "Login required",
        }
    }
}

async fn pass(parts: &mut Parts, state: &AppState, gate: Gate) -> Result<AuthUser, AppError> {
    let user = AuthUser::from_request_parts(parts, state).await?;
    if !gate.permits(&user.role) {
        tracing::debug!(user_id = %user.user_id, role = %user.role, ?gate, "Role gate denied");
        return Err(AppError::Core(CoreError::Forbidden(gate.denial().into())));
    }
    Ok(user)
}

/// `admin` only.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        pass(parts, state, Gate::Admin).await.map(Self)
    }
}

/// `owner` or `admin`: roles that list properties.
pub struct RequireOwner(pub AuthUser);

impl FromRequestParts<AppState> for RequireOwner {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        pass(parts, state, Gate::ListingManager).await.map(Self)
    }
}

/// Any role. Reads better than a bare [`AuthUser`] on routes that exist
/// only for logged-in users, such as marketplace selling and `/me`.
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        pass(parts, state, Gate::Authenticated).await.map(Self)
    }
}
