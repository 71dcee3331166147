use crate::domain::occupancy::DayCounts;
use crate::domain::ports::{Edit, ReservationStore};
use crate::domain::reservation::Reservation;
use crate::error::{BookingError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Column Family for storing reservations, keyed by id.
pub const CF_RESERVATIONS: &str = "reservations";

/// A persistent reservation store backed by RocksDB.
///
/// Values are JSON-encoded reservations without their ledger, which is
/// rebuilt on every read. The per-day room counts are rebuilt once when the
/// database is opened and then kept next to it; every write takes the
/// `counts` lock, so checking capacity and putting the record is one step.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    counts: Arc<Mutex<DayCounts>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path, ensuring
    /// the reservations column family exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_reservations = ColumnFamilyDescriptor::new(CF_RESERVATIONS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_reservations])?;

        let mut store = Self {
            db: Arc::new(db),
            counts: Arc::new(Mutex::new(DayCounts::new())),
        };
        let counts = DayCounts::from_reservations(&store.load_all()?);
        store.counts = Arc::new(Mutex::new(counts));
        Ok(store)
    }

    fn cf(&self) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(CF_RESERVATIONS)
            .ok_or_else(|| BookingError::Storage("reservations column family not found".into()))
    }

    fn put(&self, reservation: &Reservation) -> Result<()> {
        let cf = self.cf()?;
        let value = serde_json::to_vec(reservation)?;
        self.db.put_cf(cf, reservation.id().as_bytes(), value)?;
        Ok(())
    }

    fn load(&self, id: Uuid) -> Result<Option<Reservation>> {
        let cf = self.cf()?;
        match self.db.get_pinned_cf(cf, id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn load_all(&self) -> Result<Vec<Reservation>> {
        let cf = self.cf()?;
        let mut reservations = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            reservations.push(serde_json::from_slice(&value)?);
        }
        Ok(reservations)
    }
}

// These calls are synchronous RocksDB operations; reservations are small and
// the counts lock already serializes mutations.
#[async_trait]
impl ReservationStore for RocksDBStore {
    async fn insert_if_available(&self, reservation: Reservation, capacity: u32) -> Result<()> {
        let mut counts = self.counts.lock().await;
        if self.load(reservation.id())?.is_some() {
            return Err(BookingError::DuplicateReservation(reservation.id()));
        }
        if reservation.is_active() {
            counts.try_acquire(reservation.stay(), capacity)?;
        }
        if let Err(e) = self.put(&reservation) {
            if reservation.is_active() {
                counts.release(reservation.stay());
            }
            return Err(e);
        }
        Ok(())
    }

    async fn modify(&self, id: Uuid, capacity: u32, edit: Edit<'_>) -> Result<Reservation> {
        let mut counts = self.counts.lock().await;
        let previous = self.load(id)?.ok_or(BookingError::ReservationNotFound(id))?;

        let mut reservation = previous.clone();
        edit(&mut reservation)?;
        counts.transfer(&previous, &reservation, capacity)?;
        if let Err(e) = self.put(&reservation) {
            // undo: give the rooms back to the stored version
            let _ = counts.transfer(&reservation, &previous, u32::MAX);
            return Err(e);
        }
        Ok(reservation)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Reservation>> {
        self.load(id)
    }

    async fn all(&self) -> Result<Vec<Reservation>> {
        let mut all = self.load_all()?;
        all.sort_by_key(|r| (r.stay().check_in(), r.created_at(), r.id()));
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Money;
    use crate::domain::reservation::LifecycleState;
    use crate::domain::reservation::fixtures::reservation;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_rocksdb_open_cf() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).expect("Failed to open RocksDB");
        assert!(store.db.cf_handle(CF_RESERVATIONS).is_some());
    }

    #[tokio::test]
    async fn test_rocksdb_round_trip_rebuilds_ledger() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();

        let mut r = reservation(10, 12, LifecycleState::Confirmed);
        r.set_payments(Money::new(dec!(200)).unwrap(), Money::ZERO);
        store.insert_if_available(r.clone(), 4).await.unwrap();

        let retrieved = store.get(r.id()).await.unwrap().unwrap();
        assert_eq!(retrieved, r);
        assert_eq!(retrieved.ledger().balance_due, Money::new(dec!(300)).unwrap());
        assert_eq!(store.all().await.unwrap().len(), 1);
        assert!(store.get(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rocksdb_capacity_backstop() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();
        store
            .insert_if_available(reservation(10, 12, LifecycleState::Confirmed), 1)
            .await
            .unwrap();

        let err = store
            .insert_if_available(reservation(11, 12, LifecycleState::Pending), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::CapacityExceeded { .. }));
    }

    #[tokio::test]
    async fn test_rocksdb_reopen_keeps_data_and_counts() {
        let dir = tempdir().unwrap();
        let r = reservation(1, 3, LifecycleState::Pending);
        {
            let store = RocksDBStore::open(dir.path()).unwrap();
            store.insert_if_available(r.clone(), 1).await.unwrap();
        }
        let store = RocksDBStore::open(dir.path()).unwrap();
        assert_eq!(store.get(r.id()).await.unwrap().unwrap(), r);
        assert!(matches!(
            store
                .insert_if_available(reservation(2, 3, LifecycleState::Pending), 1)
                .await,
            Err(BookingError::CapacityExceeded { .. })
        ));
    }

    #[tokio::test]
    async fn test_rocksdb_modify_moves_rooms() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();
        let r = reservation(10, 12, LifecycleState::Confirmed);
        store.insert_if_available(r.clone(), 1).await.unwrap();

        let cancelled = store
            .modify(r.id(), 1, &|r: &mut Reservation| {
                r.set_status(LifecycleState::Cancelled);
                Ok(())
            })
            .await
            .unwrap();
        assert_eq!(cancelled.status(), LifecycleState::Cancelled);

        let other = reservation(11, 12, LifecycleState::Pending);
        store.insert_if_available(other, 1).await.unwrap();

        assert!(matches!(
            store
                .modify(r.id(), 1, &|r: &mut Reservation| {
                    r.set_status(LifecycleState::Confirmed);
                    Ok(())
                })
                .await,
            Err(BookingError::CapacityExceeded { .. })
        ));
        assert_eq!(
            store.get(r.id()).await.unwrap().unwrap().status(),
            LifecycleState::Cancelled
        );
    }
}
