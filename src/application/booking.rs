use crate::config::types::Config;
use crate::domain::availability::{AvailabilityReport, compute_availability};
use crate::domain::filter::ReservationFilter;
use crate::domain::intake::{BookingRequest, IntakeChannel, IntakeContext};
use crate::domain::ledger::Ledger;
use crate::domain::money::Money;
use crate::domain::ports::ReservationStoreBox;
use crate::domain::report::BookingSummary;
use crate::domain::reservation::{LifecycleState, Reservation};
use crate::domain::stay::DateRange;
use crate::error::{BookingError, Result};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// The main entry point for booking operations.
///
/// Validation reads a snapshot of the stored reservations; the store then
/// re-checks capacity under its own lock when the record is written, so a
/// booking that raced another one for the last room is still rejected.
pub struct BookingService {
    store: ReservationStoreBox,
    config: Config,
}

impl BookingService {
    pub fn new(store: ReservationStoreBox, config: Config) -> Self {
        Self { store, config }
    }

    fn capacity(&self) -> u32 {
        self.config.pool.capacity
    }

    /// Validates `request` and persists it as a new reservation.
    pub async fn submit(
        &self,
        request: BookingRequest,
        channel: IntakeChannel,
        today: NaiveDate,
    ) -> Result<Reservation> {
        let existing = self.store.all().await?;
        let ctx = IntakeContext {
            channel,
            today,
            capacity: self.capacity(),
            rates: &self.config.rates,
            overpayment: self.config.ledger.overpayment,
        };
        let validated = match request.validate(&ctx, &existing) {
            Ok(validated) => validated,
            Err(e) => {
                tracing::warn!(error = %e, "Booking rejected");
                return Err(e);
            }
        };

        let reservation = validated.persist(Uuid::new_v4(), Utc::now());
        if let Err(e) = self
            .store
            .insert_if_available(reservation.clone(), self.capacity())
            .await
        {
            tracing::warn!(error = %e, "Booking rejected at write time");
            return Err(e);
        }

        tracing::info!(
            id = %reservation.id(),
            check_in = %reservation.stay().check_in(),
            check_out = %reservation.stay().check_out(),
            status = %reservation.status(),
            "Reservation persisted"
        );
        Ok(reservation)
    }

    /// Stores an already-built reservation, e.g. a row read back from CSV.
    ///
    /// Active records go through the same capacity check as new bookings.
    pub async fn import(&self, reservation: Reservation) -> Result<()> {
        let id = reservation.id();
        self.store
            .insert_if_available(reservation, self.capacity())
            .await?;
        tracing::debug!(%id, "Reservation imported");
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Reservation> {
        self.store
            .get(id)
            .await?
            .ok_or(BookingError::ReservationNotFound(id))
    }

    /// Moves a reservation to `status`. Re-activating a cancelled booking
    /// needs a free room on every night of its stay.
    pub async fn update_status(&self, id: Uuid, status: LifecycleState) -> Result<Reservation> {
        let reservation = self
            .store
            .modify(id, self.capacity(), &|r: &mut Reservation| {
                r.set_status(status);
                Ok(())
            })
            .await?;
        tracing::info!(%id, status = %status, "Reservation status changed");
        Ok(reservation)
    }

    /// Overwrites both payments of a reservation and re-derives its ledger.
    pub async fn record_payments(
        &self,
        id: Uuid,
        initial_payment: Decimal,
        final_payment: Decimal,
    ) -> Result<Reservation> {
        let initial_payment = Money::new(initial_payment)?;
        let final_payment = Money::new(final_payment)?;
        let policy = self.config.ledger.overpayment;

        let reservation = self
            .store
            .modify(id, self.capacity(), &|r: &mut Reservation| {
                r.set_payments(initial_payment, final_payment);
                policy.check(r.ledger())
            })
            .await?;
        tracing::info!(
            %id,
            total_paid = %reservation.ledger().total_paid,
            balance_due = %reservation.ledger().balance_due,
            "Payments recorded"
        );
        Ok(reservation)
    }

    pub async fn ledger(&self, id: Uuid) -> Result<Ledger> {
        Ok(*self.find(id).await?.ledger())
    }

    /// Per-day occupancy over `range`.
    pub async fn availability(&self, range: DateRange) -> Result<AvailabilityReport> {
        let reservations = self.store.all().await?;
        tracing::debug!(
            start = %range.start(),
            end = %range.end(),
            reservations = reservations.len(),
            "Computing availability"
        );
        Ok(compute_availability(&reservations, range, self.capacity()))
    }

    /// Availability over the configured reporting window starting at `today`.
    pub async fn calendar(&self, today: NaiveDate) -> Result<AvailabilityReport> {
        self.availability(DateRange::window(today, self.config.reporting.window_days))
            .await
    }

    pub async fn summary(&self, today: NaiveDate) -> Result<BookingSummary> {
        let reservations = self.store.all().await?;
        Ok(BookingSummary::from_reservations(&reservations, today))
    }

    /// Stored reservations selected by `filter`, ordered by check-in.
    pub async fn reservations(&self, filter: &ReservationFilter) -> Result<Vec<Reservation>> {
        let mut reservations = self.store.all().await?;
        reservations.retain(|r| filter.matches(r));
        Ok(reservations)
    }
}
