//! Row models and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod audit;
pub mod booking;
pub mod household_item;
pub mod lead;
pub mod profile;
pub mod property;
pub mod slot;
pub mod stats;
