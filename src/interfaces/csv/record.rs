use crate::domain::intake::validate_guest;
use crate::domain::ledger::PaymentState;
use crate::domain::money::Money;
use crate::domain::reservation::{
    GuestDetails, LifecycleState, Reservation, ReservationParts, RoomCategory,
};
use crate::domain::stay::Stay;
use crate::error::BookingError;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One reservation as a flat CSV row.
///
/// The ledger columns (`nights` through `payment_status`) are written on
/// export but are optional on import, where they are recomputed from rate,
/// dates and payments.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct ReservationRecord {
    pub id: Uuid,
    pub guest_name: String,
    pub email: String,
    pub phone: String,
    pub room_type: RoomCategory,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u8,
    pub status: LifecycleState,
    pub room_rate: Decimal,
    #[serde(default)]
    pub initial_payment: Option<Decimal>,
    #[serde(default)]
    pub final_payment: Option<Decimal>,
    #[serde(default)]
    pub nights: Option<u32>,
    #[serde(default)]
    pub total_amount: Option<Decimal>,
    #[serde(default)]
    pub total_paid: Option<Decimal>,
    #[serde(default)]
    pub balance_due: Option<Decimal>,
    #[serde(default)]
    pub payment_status: Option<PaymentState>,
    #[serde(default)]
    pub special_requests: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&Reservation> for ReservationRecord {
    fn from(r: &Reservation) -> Self {
        let ledger = r.ledger();
        Self {
            id: r.id(),
            guest_name: r.guest().name.clone(),
            email: r.guest().email.clone(),
            phone: r.guest().phone.clone(),
            room_type: r.room_category(),
            check_in: r.stay().check_in(),
            check_out: r.stay().check_out(),
            guests: r.guest().guests_count,
            status: r.status(),
            room_rate: r.room_rate().value(),
            initial_payment: Some(r.initial_payment().value()),
            final_payment: Some(r.final_payment().value()),
            nights: Some(ledger.nights),
            total_amount: Some(ledger.total_amount.value()),
            total_paid: Some(ledger.total_paid.value()),
            balance_due: Some(ledger.balance_due.value()),
            payment_status: Some(ledger.payment_state),
            special_requests: r.guest().special_requests.clone(),
            created_at: Some(r.created_at()),
        }
    }
}

impl TryFrom<ReservationRecord> for Reservation {
    type Error = BookingError;

    fn try_from(record: ReservationRecord) -> Result<Self, Self::Error> {
        let guest = GuestDetails {
            name: record.guest_name,
            email: record.email,
            phone: record.phone,
            guests_count: record.guests,
            special_requests: record.special_requests.filter(|s| !s.trim().is_empty()),
        };
        validate_guest(&guest)?;

        let reservation: Reservation = ReservationParts {
            id: record.id,
            guest,
            room_category: record.room_type,
            stay: Stay::new(record.check_in, record.check_out)?,
            status: record.status,
            room_rate: Money::new(record.room_rate)?,
            initial_payment: Money::new(record.initial_payment.unwrap_or_default())?,
            final_payment: Money::new(record.final_payment.unwrap_or_default())?,
            created_at: record.created_at.unwrap_or_else(Utc::now),
        }
        .into();

        let ledger = reservation.ledger();
        let stale = record.nights.is_some_and(|n| n != ledger.nights)
            || record
                .total_amount
                .is_some_and(|v| v != ledger.total_amount.value())
            || record
                .total_paid
                .is_some_and(|v| v != ledger.total_paid.value())
            || record
                .balance_due
                .is_some_and(|v| v != ledger.balance_due.value())
            || record
                .payment_status
                .is_some_and(|s| s != ledger.payment_state);
        if stale {
            tracing::warn!(
                id = %reservation.id(),
                "Stored ledger fields disagree with rate, dates and payments; using recomputed values"
            );
        }

        Ok(reservation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record() -> ReservationRecord {
        ReservationRecord {
            id: Uuid::new_v4(),
            guest_name: "Yaw Mensah".into(),
            email: "yaw@example.com".into(),
            phone: "0201234567".into(),
            room_type: RoomCategory::StandardRoomOnly,
            check_in: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2025, 5, 3).unwrap(),
            guests: 1,
            status: LifecycleState::Confirmed,
            room_rate: dec!(250),
            initial_payment: Some(dec!(200)),
            final_payment: None,
            nights: Some(7),
            total_amount: Some(dec!(99999)),
            total_paid: None,
            balance_due: None,
            payment_status: Some(PaymentState::FullyPaid),
            special_requests: Some("".into()),
            created_at: None,
        }
    }

    #[test]
    fn test_stale_derived_fields_are_recomputed() {
        let reservation = Reservation::try_from(record()).unwrap();
        let ledger = reservation.ledger();
        assert_eq!(ledger.nights, 2);
        assert_eq!(ledger.total_amount, Money::new(dec!(500)).unwrap());
        assert_eq!(ledger.balance_due, Money::new(dec!(300)).unwrap());
        assert_eq!(ledger.payment_state, PaymentState::PartiallyPaid);
        assert_eq!(reservation.guest().special_requests, None);
    }

    #[test]
    fn test_invalid_rows_rejected() {
        let mut r = record();
        r.check_out = r.check_in;
        assert!(matches!(
            Reservation::try_from(r),
            Err(BookingError::InvalidDateRange { .. })
        ));

        let mut r = record();
        r.final_payment = Some(dec!(-5));
        assert!(matches!(
            Reservation::try_from(r),
            Err(BookingError::InvalidPaymentAmount { .. })
        ));

        let mut r = record();
        r.email = "nobody".into();
        assert!(matches!(
            Reservation::try_from(r),
            Err(BookingError::Validation { field: "email", .. })
        ));
    }

    #[test]
    fn test_record_from_reservation_carries_ledger() {
        let reservation = Reservation::try_from(record()).unwrap();
        let exported = ReservationRecord::from(&reservation);
        assert_eq!(exported.nights, Some(2));
        assert_eq!(exported.total_paid, Some(dec!(200)));
        assert_eq!(exported.payment_status, Some(PaymentState::PartiallyPaid));
        assert_eq!(exported.created_at, Some(reservation.created_at()));
    }
}
