use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Occupancy of a single day that blocked a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayConflict {
    pub date: NaiveDate,
    pub occupied: u32,
}

impl fmt::Display for DayConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} booked)", self.date, self.occupied)
    }
}

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Invalid date range: {reason}")]
    InvalidDateRange { reason: String },

    #[error(
        "No rooms available for selected dates: {} of {capacity} rooms are already booked on {}",
        max_occupied(.conflicts),
        join_days(.conflicts)
    )]
    CapacityExceeded {
        conflicts: Vec<DayConflict>,
        capacity: u32,
    },

    #[error("Invalid payment amount: {amount} must not be negative")]
    InvalidPaymentAmount { amount: Decimal },

    #[error("Amount out of range: {amount} exceeds the maximum of {max}")]
    AmountOutOfRange { amount: Decimal, max: Decimal },

    #[error("Overpayment detected: paid {total_paid} against a total of {total_amount}")]
    OverpaymentDetected {
        total_paid: Decimal,
        total_amount: Decimal,
    },

    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Reservation not found: {0}")]
    ReservationNotFound(Uuid),

    #[error("Duplicate reservation id: {0}")]
    DuplicateReservation(Uuid),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDb(#[from] rocksdb::Error),
}

fn max_occupied(conflicts: &[DayConflict]) -> u32 {
    conflicts.iter().map(|c| c.occupied).max().unwrap_or(0)
}

fn join_days(conflicts: &[DayConflict]) -> String {
    conflicts
        .iter()
        .map(DayConflict::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, BookingError>;
