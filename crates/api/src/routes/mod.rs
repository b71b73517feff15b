pub mod admin;
pub mod ai;
pub mod bookings;
pub mod health;
pub mod leads;
pub mod marketplace;
pub mod me;
pub mod properties;
pub mod slots;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /properties                                      list (public), create (owner)
/// /properties/mine                                 caller's listings (owner)
/// /properties/{id}                                 get, update, archive
/// /properties/{id}/publish                         compliance-gated publish (POST)
/// /properties/{id}/slots                           open slots (public), create (owner)
///
/// /slots/{id}                                      delete unbooked slot (owner)
///
/// /bookings                                        create (public), list (owner)
/// /bookings/{id}/status                            status transition (PUT)
///
/// /leads                                           capture (public), list (admin)
/// /leads/{id}                                      get (admin)
/// /leads/{id}/status                               status transition (PUT, admin)
/// /leads/{id}/requalify                            re-run scoring (POST, admin)
///
/// /marketplace/items                               list (public), create (auth)
/// /marketplace/items/{id}                          get, update, remove
///
/// /ai/compliance                                   fair-housing check (POST)
/// /ai/fraud                                        scam screen (POST)
/// /ai/content                                      listing copy + translations (POST, owner)
/// /ai/receptionist                                 visitor chat (POST)
///
/// /admin/audit-logs                                query audit trail (admin)
/// /admin/stats                                     platform counts (admin)
/// /admin/items/review                              fraud review queue (admin)
///
/// /me                                              get, upsert own profile (auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/properties", properties::router())
        .nest("/slots", slots::router())
        .nest("/bookings", bookings::router())
        .nest("/leads", leads::router())
        .nest("/marketplace/items", marketplace::router())
        .nest("/ai", ai::router())
        .nest("/admin", admin::router())
        .nest("/me", me::router())
}
