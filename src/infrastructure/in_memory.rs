use crate::domain::occupancy::DayCounts;
use crate::domain::ports::{Edit, ReservationStore};
use crate::domain::reservation::Reservation;
use crate::error::{BookingError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    reservations: HashMap<Uuid, Reservation>,
    counts: DayCounts,
}

/// A thread-safe in-memory reservation store.
///
/// Reservations and the per-day room counts live behind one
/// `Arc<RwLock<..>>`, so a capacity check and the write that follows it
/// happen under the same write guard.
#[derive(Default, Clone)]
pub struct InMemoryReservationStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryReservationStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReservationStore for InMemoryReservationStore {
    async fn insert_if_available(&self, reservation: Reservation, capacity: u32) -> Result<()> {
        let mut inner = self.inner.write().await;
        if inner.reservations.contains_key(&reservation.id()) {
            return Err(BookingError::DuplicateReservation(reservation.id()));
        }
        if reservation.is_active() {
            inner.counts.try_acquire(reservation.stay(), capacity)?;
        }
        inner.reservations.insert(reservation.id(), reservation);
        Ok(())
    }

    async fn modify(&self, id: Uuid, capacity: u32, edit: Edit<'_>) -> Result<Reservation> {
        let mut inner = self.inner.write().await;
        let Inner {
            reservations,
            counts,
        } = &mut *inner;
        let previous = reservations
            .get(&id)
            .ok_or(BookingError::ReservationNotFound(id))?;

        let mut reservation = previous.clone();
        edit(&mut reservation)?;
        counts.transfer(previous, &reservation, capacity)?;

        reservations.insert(id, reservation.clone());
        Ok(reservation)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Reservation>> {
        let inner = self.inner.read().await;
        Ok(inner.reservations.get(&id).cloned())
    }

    async fn all(&self) -> Result<Vec<Reservation>> {
        let inner = self.inner.read().await;
        let mut all: Vec<Reservation> = inner.reservations.values().cloned().collect();
        all.sort_by_key(|r| (r.stay().check_in(), r.created_at(), r.id()));
        Ok(all)
    }
}
