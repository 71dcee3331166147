//! Flat CSV representation of reservations, for import and export.

pub mod record;
pub mod reservation_reader;
pub mod reservation_writer;
