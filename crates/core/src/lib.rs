//! Domain logic shared by the database, AI and API crates.
//!
//! Nothing in here talks to the network or the database. Every module is
//! pure (or, for [`rate_limit`], in-memory only) so it can be unit tested
//! without infrastructure.

pub mod audit;
pub mod booking;
pub mod compliance;
pub mod error;
pub mod fraud;
pub mod idempotency;
pub mod lead;
pub mod listing;
pub mod marketplace;
pub mod rate_limit;
pub mod roles;
pub mod sanitize;
pub mod search;
pub mod types;
