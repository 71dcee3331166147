use super::ledger::PaymentState;
use super::money::Money;
use super::reservation::{LifecycleState, Reservation};
use super::stay::DateRange;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// Days ahead counted as "upcoming" for confirmed arrivals.
pub const UPCOMING_WINDOW_DAYS: u32 = 30;

/// Dashboard figures over the whole reservation set.
#[derive(Debug, Serialize, PartialEq, Eq, Clone, Default)]
pub struct BookingSummary {
    pub total: usize,
    pub pending: usize,
    pub confirmed: usize,
    pub cancelled: usize,
    pub total_guests: u32,
    /// Sum of everything paid so far.
    pub total_revenue: Money,
    pub outstanding_balance: Money,
    /// Unpaid bookings that are not cancelled.
    pub unpaid: usize,
    pub partially_paid: usize,
    /// Confirmed arrivals between today and the end of the upcoming window.
    pub upcoming: usize,
    /// Non-cancelled bookings created since the first of the current month.
    pub this_month: usize,
}

impl BookingSummary {
    pub fn from_reservations<'a, I>(reservations: I, today: NaiveDate) -> Self
    where
        I: IntoIterator<Item = &'a Reservation>,
    {
        let upcoming = DateRange::window(today, UPCOMING_WINDOW_DAYS);
        let month_start = today.with_day(1).unwrap_or(today);

        let mut summary = Self::default();
        for r in reservations {
            let ledger = r.ledger();
            summary.total += 1;
            match r.status() {
                LifecycleState::Pending => summary.pending += 1,
                LifecycleState::Confirmed => summary.confirmed += 1,
                LifecycleState::Cancelled => summary.cancelled += 1,
            }
            summary.total_guests += u32::from(r.guest().guests_count);
            summary.total_revenue += ledger.total_paid;
            summary.outstanding_balance += ledger.balance_due;

            match ledger.payment_state {
                PaymentState::Unpaid if r.is_active() => summary.unpaid += 1,
                PaymentState::PartiallyPaid => summary.partially_paid += 1,
                _ => {}
            }
            if r.status() == LifecycleState::Confirmed && upcoming.contains(r.stay().check_in()) {
                summary.upcoming += 1;
            }
            if r.is_active() && r.created_at().date_naive() >= month_start {
                summary.this_month += 1;
            }
        }
        summary
    }
}
