//! Application layer orchestrating bookings.
//!
//! `BookingService` owns the storage backend and the configuration, runs
//! intake validation against the stored reservations and hands the result to
//! the store's atomic capacity check.

pub mod booking;
