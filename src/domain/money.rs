use crate::error::BookingError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};

/// A non-negative currency amount.
///
/// Wraps `rust_decimal::Decimal` so that rates, payments and ledger totals can
/// never go below zero. Construction from untrusted input goes through
/// [`Money::new`] (or `TryFrom<Decimal>`), which rejects negative values and
/// anything above [`Money::MAX`]. With inputs in that range a ledger total
/// stays far below `Decimal::MAX`; arithmetic saturates instead of panicking.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Largest amount accepted as a rate or a payment.
    pub const MAX: Self = Self(Decimal::from_parts(3_567_587_328, 232, 0, false, 0));

    pub fn new(value: Decimal) -> Result<Self, BookingError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(BookingError::InvalidPaymentAmount { amount: value });
        }
        if value > Self::MAX.0 {
            return Err(BookingError::AmountOutOfRange {
                amount: value,
                max: Self::MAX.0,
            });
        }
        Ok(Self(value.normalize()))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Difference floored at zero.
    pub fn saturating_sub(self, rhs: Self) -> Self {
        if self.0 > rhs.0 {
            Self((self.0 - rhs.0).normalize())
        } else {
            Self::ZERO
        }
    }
}

impl TryFrom<Decimal> for Money {
    type Error = BookingError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0).normalize())
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// Price of `n` nights at this rate.
impl Mul<u32> for Money {
    type Output = Self;
    fn mul(self, nights: u32) -> Self::Output {
        Self(self.0.saturating_mul(Decimal::from(nights)).normalize())
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}
