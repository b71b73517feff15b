//! Request extractors and middleware.
//!
//! - [`auth::AuthUser`] -- the caller decoded from a Bearer token.
//! - [`rbac::RequireAdmin`] -- requires the `admin` role.
//! - [`rbac::RequireOwner`] -- requires `owner` or `admin`.
//! - [`rbac::RequireAuth`] -- requires any authenticated caller.
//! - [`rate_limit::RateLimited`] -- charges a named rate-limit policy.

pub mod auth;
pub mod rate_limit;
pub mod rbac;
