use super::reservation::Reservation;
use crate::error::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// In-place change applied to a stored reservation by
/// [`ReservationStore::modify`]. Returning an error aborts the write.
pub type Edit<'a> = &'a (dyn Fn(&mut Reservation) -> Result<()> + Send + Sync);

/// Persistence boundary for reservations.
///
/// Writes that can take rooms must re-check capacity atomically with the
/// write itself: reading availability and inserting afterwards is racy when
/// several callers book at once.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Inserts `reservation` if every night of its stay still has a free room,
    /// failing with `CapacityExceeded` otherwise. Inactive reservations are
    /// inserted unconditionally.
    async fn insert_if_available(&self, reservation: Reservation, capacity: u32) -> Result<()>;

    /// Reads the current record, applies `edit` and writes it back as one
    /// step, so concurrent edits of different fields of the same reservation
    /// never undo each other. An edit that makes the reservation take rooms it
    /// did not hold before is subject to the same capacity check as an
    /// insert. Returns the stored result.
    async fn modify(&self, id: Uuid, capacity: u32, edit: Edit<'_>) -> Result<Reservation>;

    async fn get(&self, id: Uuid) -> Result<Option<Reservation>>;

    async fn all(&self) -> Result<Vec<Reservation>>;
}

pub type ReservationStoreBox = Box<dyn ReservationStore>;
