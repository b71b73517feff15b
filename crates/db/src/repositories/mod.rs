//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod audit_repo;
pub mod booking_repo;
pub mod household_item_repo;
pub mod lead_repo;
pub mod profile_repo;
pub mod property_repo;
pub mod slot_repo;
pub mod stats_repo;

pub use audit_repo::AuditRepo;
pub use booking_repo::BookingRepo;
pub use household_item_repo::HouseholdItemRepo;
pub use lead_repo::LeadRepo;
pub use profile_repo::ProfileRepo;
pub use property_repo::PropertyRepo;
pub use slot_repo::SlotRepo;
pub use stats_repo::StatsRepo;
