use super::reservation::Reservation;
use super::stay::{DateRange, Stay};
use crate::error::{BookingError, DayConflict};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Calendar classification of a single day.
#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    Available,
    PartiallyBooked,
    FullyBooked,
}

impl fmt::Display for DayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Available => "available",
            Self::PartiallyBooked => "partially_booked",
            Self::FullyBooked => "fully_booked",
        })
    }
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone)]
pub struct DayAvailability {
    pub date: NaiveDate,
    pub occupied: u32,
    pub free: u32,
    pub is_full: bool,
    /// Active reservations holding a room on this day.
    pub reservations: Vec<Uuid>,
}

impl DayAvailability {
    fn new(date: NaiveDate, occupied: u32, capacity: u32, reservations: Vec<Uuid>) -> Self {
        Self {
            date,
            occupied,
            free: capacity.saturating_sub(occupied),
            is_full: occupied >= capacity,
            reservations,
        }
    }

    pub fn status(&self) -> DayStatus {
        if self.is_full {
            DayStatus::FullyBooked
        } else if self.occupied > 0 {
            DayStatus::PartiallyBooked
        } else {
            DayStatus::Available
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone)]
pub struct AvailabilityReport {
    pub capacity: u32,
    pub days: Vec<DayAvailability>,
    /// Occupancy of the busiest day in the range.
    pub max_occupied: u32,
}

impl AvailabilityReport {
    pub fn day(&self, date: NaiveDate) -> Option<&DayAvailability> {
        self.days.iter().find(|d| d.date == date)
    }

    /// Whether a new stay covering every day of the range would fit.
    pub fn has_room(&self) -> bool {
        self.max_occupied < self.capacity
    }

    /// Days at or above capacity.
    pub fn full_days(&self) -> Vec<DayConflict> {
        self.days
            .iter()
            .filter(|d| d.is_full)
            .map(|d| DayConflict {
                date: d.date,
                occupied: d.occupied,
            })
            .collect()
    }
}

/// Per-day occupancy of `range` given the reservation set.
///
/// A reservation occupies day `d` when it is active and
/// `check_in <= d < check_out`. Order of `reservations` is irrelevant.
pub fn compute_availability<'a, I>(
    reservations: I,
    range: impl Into<DateRange>,
    capacity: u32,
) -> AvailabilityReport
where
    I: IntoIterator<Item = &'a Reservation>,
{
    let range = range.into();
    let len = (range.end() - range.start()).num_days() as usize + 1;
    let mut occupants: Vec<Vec<Uuid>> = vec![Vec::new(); len];

    for reservation in reservations.into_iter().filter(|r| r.is_active()) {
        let stay = reservation.stay();
        let first = stay.check_in().max(range.start());
        // last occupied night is the day before check-out
        let Some(last) = stay.check_out().pred_opt() else {
            continue;
        };
        let last = last.min(range.end());
        if first > last {
            continue;
        }
        let from = (first - range.start()).num_days() as usize;
        let to = (last - range.start()).num_days() as usize;
        for slot in &mut occupants[from..=to] {
            slot.push(reservation.id());
        }
    }

    let days: Vec<DayAvailability> = range
        .days()
        .zip(occupants)
        .map(|(date, ids)| DayAvailability::new(date, ids.len() as u32, capacity, ids))
        .collect();
    let max_occupied = days.iter().map(|d| d.occupied).max().unwrap_or(0);

    AvailabilityReport {
        capacity,
        days,
        max_occupied,
    }
}

/// Checks whether `stay` fits into the pool alongside `reservations`.
///
/// Fails with `CapacityExceeded` naming every night of the stay that is
/// already at capacity.
pub fn check_capacity<'a, I>(
    reservations: I,
    stay: &Stay,
    capacity: u32,
) -> Result<AvailabilityReport, BookingError>
where
    I: IntoIterator<Item = &'a Reservation>,
{
    let report = compute_availability(reservations, stay.occupied_range(), capacity);
    if report.has_room() {
        Ok(report)
    } else {
        Err(BookingError::CapacityExceeded {
            conflicts: report.full_days(),
            capacity,
        })
    }
}
