pub mod admin;
pub mod ai;
pub mod bookings;
pub mod leads;
pub mod marketplace;
pub mod me;
pub mod properties;
pub mod slots;
