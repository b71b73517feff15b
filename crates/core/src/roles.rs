//! Well-known role name constants.
//!
//! These must match the `role` claim written by the identity platform and the
//! `profiles.role` check constraint.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_OWNER: &str = "owner";
pub const ROLE_CUSTOMER: &str = "customer";

/// All roles a profile may carry.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_OWNER, ROLE_CUSTOMER];

/// Whether the role may manage listings (owners and admins).
pub fn can_manage_listings(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_OWNER
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owners_and_admins_manage_listings() {
        assert!(can_manage_listings(ROLE_ADMIN));
        assert!(can_manage_listings(ROLE_OWNER));
        assert!(!can_manage_listings(ROLE_CUSTOMER));
        assert!(!can_manage_listings(""));
    }
}
