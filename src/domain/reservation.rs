use super::ledger::{Ledger, compute_ledger};
use super::money::Money;
use super::stay::Stay;
use crate::error::BookingError;
use chrono::{DateTime, Utc};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
}

impl LifecycleState {
    /// Pending and confirmed reservations hold a room; cancelled ones never do.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifecycleState {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(BookingError::Validation {
                field: "status",
                reason: format!("unknown status '{other}'"),
            }),
        }
    }
}

/// Room categories offered by the house. They only determine the nightly
/// rate; every category draws from the same room pool.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum RoomCategory {
    StandardRoomOnly,
    StandardWithBreakfast,
}

impl RoomCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StandardRoomOnly => "standard-room-only",
            Self::StandardWithBreakfast => "standard-with-breakfast",
        }
    }
}

impl fmt::Display for RoomCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoomCategory {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "standard-room-only" => Ok(Self::StandardRoomOnly),
            "standard-with-breakfast" => Ok(Self::StandardWithBreakfast),
            other => Err(BookingError::Validation {
                field: "room_type",
                reason: format!("unknown room category '{other}'"),
            }),
        }
    }
}

/// Nightly rate per room category.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct RoomRates {
    #[serde(default = "default_room_only_rate")]
    pub standard_room_only: Money,
    #[serde(default = "default_breakfast_rate")]
    pub standard_with_breakfast: Money,
}

fn default_room_only_rate() -> Money {
    Money::new(dec!(250)).unwrap_or_default()
}

fn default_breakfast_rate() -> Money {
    Money::new(dec!(280)).unwrap_or_default()
}

impl Default for RoomRates {
    fn default() -> Self {
        Self {
            standard_room_only: default_room_only_rate(),
            standard_with_breakfast: default_breakfast_rate(),
        }
    }
}

impl RoomRates {
    pub fn rate(&self, category: RoomCategory) -> Money {
        match category {
            RoomCategory::StandardRoomOnly => self.standard_room_only,
            RoomCategory::StandardWithBreakfast => self.standard_with_breakfast,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct GuestDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub guests_count: u8,
    #[serde(default)]
    pub special_requests: Option<String>,
}

/// A booking of one room from the pool.
///
/// The ledger is a cached view of `room_rate`, `stay` and the two payments.
/// Fields feeding it are private so that every mutation goes through a
/// method that re-derives it, and deserialization rebuilds it from the
/// source fields.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(from = "ReservationParts")]
pub struct Reservation {
    id: Uuid,
    guest: GuestDetails,
    room_category: RoomCategory,
    stay: Stay,
    status: LifecycleState,
    room_rate: Money,
    initial_payment: Money,
    final_payment: Money,
    created_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    ledger: Ledger,
}

/// Parts needed to assemble a [`Reservation`]; the ledger is always derived.
#[derive(Debug, Clone, Deserialize)]
pub struct ReservationParts {
    pub id: Uuid,
    pub guest: GuestDetails,
    pub room_category: RoomCategory,
    pub stay: Stay,
    pub status: LifecycleState,
    pub room_rate: Money,
    pub initial_payment: Money,
    pub final_payment: Money,
    pub created_at: DateTime<Utc>,
}

impl From<ReservationParts> for Reservation {
    fn from(parts: ReservationParts) -> Self {
        let ledger = compute_ledger(
            parts.room_rate,
            &parts.stay,
            parts.initial_payment,
            parts.final_payment,
        );
        Self {
            id: parts.id,
            guest: parts.guest,
            room_category: parts.room_category,
            stay: parts.stay,
            status: parts.status,
            room_rate: parts.room_rate,
            initial_payment: parts.initial_payment,
            final_payment: parts.final_payment,
            created_at: parts.created_at,
            ledger,
        }
    }
}

impl Reservation {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn guest(&self) -> &GuestDetails {
        &self.guest
    }

    pub fn room_category(&self) -> RoomCategory {
        self.room_category
    }

    pub fn stay(&self) -> &Stay {
        &self.stay
    }

    pub fn status(&self) -> LifecycleState {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn room_rate(&self) -> Money {
        self.room_rate
    }

    pub fn initial_payment(&self) -> Money {
        self.initial_payment
    }

    pub fn final_payment(&self) -> Money {
        self.final_payment
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn set_status(&mut self, status: LifecycleState) {
        self.status = status;
    }

    /// Overwrites both payments and re-derives the ledger.
    pub fn set_payments(&mut self, initial_payment: Money, final_payment: Money) {
        self.initial_payment = initial_payment;
        self.final_payment = final_payment;
        self.refresh_ledger();
    }

    fn refresh_ledger(&mut self) {
        self.ledger = compute_ledger(
            self.room_rate,
            &self.stay,
            self.initial_payment,
            self.final_payment,
        );
    }
}
