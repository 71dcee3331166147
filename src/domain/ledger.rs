use super::money::Money;
use super::stay::Stay;
use crate::error::BookingError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PaymentState {
    #[default]
    Unpaid,
    PartiallyPaid,
    FullyPaid,
}

impl PaymentState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::PartiallyPaid => "partially_paid",
            Self::FullyPaid => "fully_paid",
        }
    }
}

impl fmt::Display for PaymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentState {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "unpaid" => Ok(Self::Unpaid),
            "partially_paid" => Ok(Self::PartiallyPaid),
            "fully_paid" => Ok(Self::FullyPaid),
            other => Err(BookingError::Validation {
                field: "payment_status",
                reason: format!("unknown payment status '{other}'"),
            }),
        }
    }
}

/// Financial summary of a reservation, derived from rate, stay and payments.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
pub struct Ledger {
    pub nights: u32,
    pub total_amount: Money,
    pub total_paid: Money,
    /// Outstanding amount, never negative.
    pub balance_due: Money,
    /// Amount paid beyond `total_amount`. Zero unless overpaid.
    pub overpaid: Money,
    pub payment_state: PaymentState,
}

impl Ledger {
    pub fn is_overpaid(&self) -> bool {
        !self.overpaid.is_zero()
    }
}

/// Derives the ledger of a stay. Pure: identical inputs always give an
/// identical ledger.
pub fn compute_ledger(
    room_rate: Money,
    stay: &Stay,
    initial_payment: Money,
    final_payment: Money,
) -> Ledger {
    let nights = stay.nights();
    let total_amount = room_rate * nights;
    let total_paid = initial_payment + final_payment;
    let balance_due = total_amount.saturating_sub(total_paid);
    let overpaid = total_paid.saturating_sub(total_amount);

    let payment_state = if total_paid.is_zero() {
        PaymentState::Unpaid
    } else if balance_due.is_zero() {
        PaymentState::FullyPaid
    } else {
        PaymentState::PartiallyPaid
    };

    Ledger {
        nights,
        total_amount,
        total_paid,
        balance_due,
        overpaid,
        payment_state,
    }
}

/// What to do when recorded payments exceed the amount due.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum OverpaymentPolicy {
    /// Refuse the write with `OverpaymentDetected`.
    #[default]
    Reject,
    /// Accept it; the balance is clamped to zero and the surplus is kept in
    /// `Ledger::overpaid`.
    Clamp,
}

impl OverpaymentPolicy {
    pub fn check(self, ledger: &Ledger) -> Result<(), BookingError> {
        if !ledger.is_overpaid() {
            return Ok(());
        }
        match self {
            Self::Reject => Err(BookingError::OverpaymentDetected {
                total_paid: ledger.total_paid.value(),
                total_amount: ledger.total_amount.value(),
            }),
            Self::Clamp => {
                tracing::warn!(
                    total_paid = %ledger.total_paid,
                    total_amount = %ledger.total_amount,
                    overpaid = %ledger.overpaid,
                    "Overpayment accepted, balance clamped to zero"
                );
                Ok(())
            }
        }
    }
}
