//! Booking intake: a proposed request is either validated and then persisted
//! as a [`Reservation`], or rejected with the reason.

use super::availability::check_capacity;
use super::ledger::{Ledger, OverpaymentPolicy, compute_ledger};
use super::money::Money;
use super::reservation::{
    GuestDetails, LifecycleState, Reservation, ReservationParts, RoomCategory, RoomRates,
};
use super::stay::Stay;
use crate::error::BookingError;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const MAX_GUESTS: u8 = 4;
const MAX_SPECIAL_REQUESTS: usize = 500;

/// Where a booking request comes from.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum IntakeChannel {
    /// Public booking form: check-in may not be in the past, the booking
    /// starts out pending and unpaid.
    Guest,
    /// Staff entry: any dates, any initial status, payments allowed.
    Staff,
}

/// A proposed booking, as collected by a form.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct BookingRequest {
    pub guest: GuestDetails,
    pub room_category: RoomCategory,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    #[serde(default)]
    pub status: LifecycleState,
    #[serde(default)]
    pub initial_payment: Decimal,
    #[serde(default)]
    pub final_payment: Decimal,
}

/// Everything validation needs besides the request and the existing bookings.
#[derive(Debug, Clone, Copy)]
pub struct IntakeContext<'a> {
    pub channel: IntakeChannel,
    pub today: NaiveDate,
    pub capacity: u32,
    pub rates: &'a RoomRates,
    pub overpayment: OverpaymentPolicy,
}

/// A request that passed every check and carries its stamped ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedBooking {
    guest: GuestDetails,
    room_category: RoomCategory,
    stay: Stay,
    status: LifecycleState,
    room_rate: Money,
    initial_payment: Money,
    final_payment: Money,
    ledger: Ledger,
}

impl BookingRequest {
    /// Runs every intake check against the existing reservation set.
    ///
    /// Checks, in order: date ordering, guest fields, payment amounts,
    /// overpayment policy, capacity. Capacity is only consulted for active
    /// bookings; a booking entered as cancelled takes no room.
    pub fn validate<'a, I>(
        self,
        ctx: &IntakeContext<'_>,
        existing: I,
    ) -> Result<ValidatedBooking, BookingError>
    where
        I: IntoIterator<Item = &'a Reservation>,
    {
        let stay = Stay::new(self.check_in, self.check_out)?;
        if ctx.channel == IntakeChannel::Guest && stay.check_in() < ctx.today {
            return Err(BookingError::InvalidDateRange {
                reason: format!(
                    "check-in {} is in the past (today is {})",
                    stay.check_in(),
                    ctx.today
                ),
            });
        }
        validate_guest(&self.guest)?;

        let (status, initial_payment, final_payment) = match ctx.channel {
            IntakeChannel::Guest => (LifecycleState::Pending, Money::ZERO, Money::ZERO),
            IntakeChannel::Staff => (
                self.status,
                Money::new(self.initial_payment)?,
                Money::new(self.final_payment)?,
            ),
        };

        let room_rate = ctx.rates.rate(self.room_category);
        let ledger = compute_ledger(room_rate, &stay, initial_payment, final_payment);
        ctx.overpayment.check(&ledger)?;

        if status.is_active() {
            check_capacity(existing, &stay, ctx.capacity)?;
        }

        Ok(ValidatedBooking {
            guest: self.guest,
            room_category: self.room_category,
            stay,
            status,
            room_rate,
            initial_payment,
            final_payment,
            ledger,
        })
    }
}

impl ValidatedBooking {
    pub fn status(&self) -> LifecycleState {
        self.status
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Turns the booking into a record ready for storage.
    pub fn persist(self, id: Uuid, created_at: DateTime<Utc>) -> Reservation {
        ReservationParts {
            id,
            guest: self.guest,
            room_category: self.room_category,
            stay: self.stay,
            status: self.status,
            room_rate: self.room_rate,
            initial_payment: self.initial_payment,
            final_payment: self.final_payment,
            created_at,
        }
        .into()
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> BookingError {
    BookingError::Validation {
        field,
        reason: reason.into(),
    }
}

pub fn validate_guest(guest: &GuestDetails) -> Result<(), BookingError> {
    let name_len = guest.name.trim().chars().count();
    if name_len < 2 {
        return Err(invalid("guest_name", "must be at least 2 characters"));
    }
    if name_len > 100 {
        return Err(invalid("guest_name", "must be at most 100 characters"));
    }

    let email = guest.email.trim();
    let valid_email = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    };
    if !valid_email {
        return Err(invalid("email", format!("'{email}' is not a valid email")));
    }

    let phone_len = guest.phone.trim().chars().count();
    if !(10..=20).contains(&phone_len) {
        return Err(invalid("phone", "must be between 10 and 20 characters"));
    }

    if !(1..=MAX_GUESTS).contains(&guest.guests_count) {
        return Err(invalid(
            "guests_count",
            format!("must be between 1 and {MAX_GUESTS}"),
        ));
    }

    if let Some(requests) = &guest.special_requests
        && requests.chars().count() > MAX_SPECIAL_REQUESTS
    {
        return Err(invalid(
            "special_requests",
            format!("must be at most {MAX_SPECIAL_REQUESTS} characters"),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ledger::PaymentState;
    use crate::domain::reservation::fixtures::{day, guest, reservation};
    use rust_decimal_macros::dec;

    fn request(check_in: u32, check_out: u32) -> BookingRequest {
        BookingRequest {
            guest: guest("Kofi"),
            room_category: RoomCategory::StandardRoomOnly,
            check_in: day(check_in),
            check_out: day(check_out),
            status: LifecycleState::Pending,
            initial_payment: Decimal::ZERO,
            final_payment: Decimal::ZERO,
        }
    }

    fn ctx(channel: IntakeChannel, rates: &RoomRates) -> IntakeContext<'_> {
        IntakeContext {
            channel,
            today: day(5),
            capacity: 4,
            rates,
            overpayment: OverpaymentPolicy::Reject,
        }
    }

    fn full_on_day_11() -> Vec<Reservation> {
        vec![
            reservation(10, 12, LifecycleState::Confirmed),
            reservation(10, 12, LifecycleState::Confirmed),
            reservation(10, 12, LifecycleState::Pending),
            reservation(11, 13, LifecycleState::Confirmed),
        ]
    }

    #[test]
    fn test_request_rejected_when_day_full() {
        let rates = RoomRates::default();
        let err = request(11, 12)
            .validate(&ctx(IntakeChannel::Staff, &rates), &full_on_day_11())
            .unwrap_err();
        match err {
            BookingError::CapacityExceeded { conflicts, .. } => {
                assert_eq!(conflicts.len(), 1);
                assert_eq!(conflicts[0].date, day(11));
                assert_eq!(conflicts[0].occupied, 4);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_request_validated_and_persisted() {
        let rates = RoomRates::default();
        let mut req = request(12, 14);
        req.status = LifecycleState::Confirmed;
        req.initial_payment = dec!(200);

        let validated = req
            .validate(&ctx(IntakeChannel::Staff, &rates), &full_on_day_11())
            .unwrap();
        assert_eq!(validated.ledger().payment_state, PaymentState::PartiallyPaid);

        let id = Uuid::new_v4();
        let reservation = validated.persist(id, Utc::now());
        assert_eq!(reservation.id(), id);
        assert_eq!(reservation.status(), LifecycleState::Confirmed);
        assert_eq!(reservation.ledger().nights, 2);
        assert_eq!(
            reservation.ledger().balance_due,
            Money::new(dec!(300)).unwrap()
        );
    }

    #[test]
    fn test_zero_night_request_rejected() {
        let rates = RoomRates::default();
        let err = request(10, 10)
            .validate(&ctx(IntakeChannel::Staff, &rates), &Vec::<Reservation>::new())
            .unwrap_err();
        assert!(matches!(err, BookingError::InvalidDateRange { .. }));
    }

    #[test]
    fn test_guest_cannot_book_in_the_past() {
        let rates = RoomRates::default();
        let err = request(3, 6)
            .validate(&ctx(IntakeChannel::Guest, &rates), &Vec::<Reservation>::new())
            .unwrap_err();
        assert!(matches!(err, BookingError::InvalidDateRange { .. }));

        // staff may back-date
        assert!(
            request(3, 6)
                .validate(&ctx(IntakeChannel::Staff, &rates), &Vec::<Reservation>::new())
                .is_ok()
        );
    }

    #[test]
    fn test_guest_can_check_in_today() {
        let rates = RoomRates::default();
        let validated = request(5, 6)
            .validate(&ctx(IntakeChannel::Guest, &rates), &Vec::<Reservation>::new())
            .unwrap();
        assert_eq!(validated.ledger().nights, 1);
        assert_eq!(validated.status(), LifecycleState::Pending);
    }

    #[test]
    fn test_payment_beyond_maximum_rejected() {
        let rates = RoomRates::default();
        let mut req = request(6, 8);
        req.initial_payment = Decimal::MAX;
        req.final_payment = Decimal::ONE;
        let err = req
            .validate(&ctx(IntakeChannel::Staff, &rates), &Vec::<Reservation>::new())
            .unwrap_err();
        assert!(matches!(err, BookingError::AmountOutOfRange { .. }));
    }

    #[test]
    fn test_guest_booking_is_pending_and_unpaid() {
        let rates = RoomRates::default();
        let mut req = request(6, 8);
        req.status = LifecycleState::Confirmed;
        req.initial_payment = dec!(100);
        let validated = req
            .validate(&ctx(IntakeChannel::Guest, &rates), &Vec::<Reservation>::new())
            .unwrap();
        assert_eq!(validated.status(), LifecycleState::Pending);
        assert_eq!(validated.ledger().payment_state, PaymentState::Unpaid);
    }

    #[test]
    fn test_negative_payment_rejected() {
        let rates = RoomRates::default();
        let mut req = request(6, 8);
        req.final_payment = dec!(-1);
        let err = req
            .validate(&ctx(IntakeChannel::Staff, &rates), &Vec::<Reservation>::new())
            .unwrap_err();
        assert!(matches!(err, BookingError::InvalidPaymentAmount { .. }));
    }

    #[test]
    fn test_overpayment_rejected_by_default_policy() {
        let rates = RoomRates::default();
        let mut req = request(6, 7);
        req.initial_payment = dec!(300);
        let err = req
            .validate(&ctx(IntakeChannel::Staff, &rates), &Vec::<Reservation>::new())
            .unwrap_err();
        assert!(matches!(err, BookingError::OverpaymentDetected { .. }));
    }

    #[test]
    fn test_cancelled_staff_entry_skips_capacity() {
        let rates = RoomRates::default();
        let mut req = request(11, 12);
        req.status = LifecycleState::Cancelled;
        assert!(
            req.validate(&ctx(IntakeChannel::Staff, &rates), &full_on_day_11())
                .is_ok()
        );
    }

    #[test]
    fn test_breakfast_rate() {
        let rates = RoomRates::default();
        let mut req = request(6, 8);
        req.room_category = RoomCategory::StandardWithBreakfast;
        let validated = req
            .validate(&ctx(IntakeChannel::Staff, &rates), &Vec::<Reservation>::new())
            .unwrap();
        assert_eq!(validated.ledger().total_amount, Money::new(dec!(560)).unwrap());
    }

    #[test]
    fn test_guest_field_rules() {
        let mut g = guest("Esi");
        assert!(validate_guest(&g).is_ok());

        g.name = "E".into();
        assert!(matches!(
            validate_guest(&g),
            Err(BookingError::Validation { field: "guest_name", .. })
        ));

        let mut g = guest("Esi");
        g.email = "esi.example.com".into();
        assert!(matches!(
            validate_guest(&g),
            Err(BookingError::Validation { field: "email", .. })
        ));

        let mut g = guest("Esi");
        g.phone = "12345".into();
        assert!(matches!(
            validate_guest(&g),
            Err(BookingError::Validation { field: "phone", .. })
        ));

        let mut g = guest("Esi");
        g.guests_count = 5;
        assert!(matches!(
            validate_guest(&g),
            Err(BookingError::Validation { field: "guests_count", .. })
        ));

        let mut g = guest("Esi");
        g.special_requests = Some("x".repeat(501));
        assert!(matches!(
            validate_guest(&g),
            Err(BookingError::Validation { field: "special_requests", .. })
        ));
    }
}
