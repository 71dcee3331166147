use super::reservation::Reservation;
use super::stay::Stay;
use crate::error::{BookingError, DayConflict};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Counted semaphore per day over the room pool.
///
/// Stores hold one of these next to their reservations and mutate both under
/// the same lock, so that checking capacity and taking the rooms is a single
/// step.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DayCounts {
    counts: BTreeMap<NaiveDate, u32>,
}

impl DayCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the counts from the active members of `reservations`.
    pub fn from_reservations<'a, I>(reservations: I) -> Self
    where
        I: IntoIterator<Item = &'a Reservation>,
    {
        let mut counts = Self::new();
        for reservation in reservations.into_iter().filter(|r| r.is_active()) {
            counts.hold(reservation.stay());
        }
        counts
    }

    pub fn occupied(&self, day: NaiveDate) -> u32 {
        self.counts.get(&day).copied().unwrap_or(0)
    }

    /// Takes one room on every night of `stay`, or none if any night is
    /// already at `capacity`.
    pub fn try_acquire(&mut self, stay: &Stay, capacity: u32) -> Result<(), BookingError> {
        let conflicts: Vec<DayConflict> = stay
            .days()
            .map(|date| DayConflict {
                date,
                occupied: self.occupied(date),
            })
            .filter(|c| c.occupied >= capacity)
            .collect();
        if !conflicts.is_empty() {
            return Err(BookingError::CapacityExceeded {
                conflicts,
                capacity,
            });
        }
        self.hold(stay);
        Ok(())
    }

    /// Gives back the rooms held by `stay`.
    pub fn release(&mut self, stay: &Stay) {
        for date in stay.days() {
            if let Some(count) = self.counts.get_mut(&date) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    self.counts.remove(&date);
                }
            }
        }
    }

    /// Moves the rooms held by `previous` over to `next`, two versions of the
    /// same reservation. Nothing changes when both hold the same nights; when
    /// `next` cannot get its rooms, `previous` keeps its own.
    pub fn transfer(
        &mut self,
        previous: &Reservation,
        next: &Reservation,
        capacity: u32,
    ) -> Result<(), BookingError> {
        let held = previous.is_active().then(|| *previous.stay());
        let wanted = next.is_active().then(|| *next.stay());
        if held == wanted {
            return Ok(());
        }
        if let Some(stay) = &held {
            self.release(stay);
        }
        if let Some(stay) = &wanted
            && let Err(e) = self.try_acquire(stay, capacity)
        {
            if let Some(stay) = &held {
                self.hold(stay);
            }
            return Err(e);
        }
        Ok(())
    }

    /// Takes one room on every night of `stay` without checking capacity.
    pub fn hold(&mut self, stay: &Stay) {
        for date in stay.days() {
            *self.counts.entry(date).or_insert(0) += 1;
        }
    }
}
