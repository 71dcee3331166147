use super::record::ReservationRecord;
use crate::domain::availability::{AvailabilityReport, DayStatus};
use crate::domain::ledger::Ledger;
use crate::domain::report::BookingSummary;
use crate::domain::reservation::Reservation;
use crate::error::Result;
use chrono::NaiveDate;
use serde::Serialize;
use std::io::Write;
use uuid::Uuid;

#[derive(Serialize)]
struct DayRow {
    date: NaiveDate,
    occupied: u32,
    free: u32,
    is_full: bool,
    status: DayStatus,
    /// Ids of the reservations holding a room, `;`-separated.
    reservations: String,
}

/// Writes reservations and engine results as CSV.
pub struct ReservationWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ReservationWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// Writes one row per reservation, ledger columns included.
    pub fn write_reservations<'a, I>(&mut self, reservations: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Reservation>,
    {
        for reservation in reservations {
            self.writer.serialize(ReservationRecord::from(reservation))?;
        }
        self.writer.flush()?;
        Ok(())
    }

    /// Writes one row per day of the report.
    pub fn write_availability(&mut self, report: &AvailabilityReport) -> Result<()> {
        for day in &report.days {
            self.writer.serialize(DayRow {
                date: day.date,
                occupied: day.occupied,
                free: day.free,
                is_full: day.is_full,
                status: day.status(),
                reservations: day
                    .reservations
                    .iter()
                    .map(Uuid::to_string)
                    .collect::<Vec<_>>()
                    .join(";"),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }

    pub fn write_ledger(&mut self, ledger: &Ledger) -> Result<()> {
        self.writer.serialize(ledger)?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn write_summary(&mut self, summary: &BookingSummary) -> Result<()> {
        self.writer.serialize(summary)?;
        self.writer.flush()?;
        Ok(())
    }
}
