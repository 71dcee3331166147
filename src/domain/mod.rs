//! Pure booking domain: reservations, availability and the payment ledger.
//!
//! Nothing in here performs I/O. Storage is reached through the traits in
//! [`ports`].

pub mod availability;
pub mod filter;
pub mod intake;
pub mod ledger;
pub mod money;
pub mod occupancy;
pub mod ports;
pub mod report;
pub mod reservation;
pub mod stay;
