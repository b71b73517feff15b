//! Verification of identity-platform access tokens.

pub mod jwt;
