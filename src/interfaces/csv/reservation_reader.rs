use super::record::ReservationRecord;
use crate::domain::reservation::Reservation;
use crate::error::{BookingError, Result};
use std::io::Read;

/// Reads reservations from a CSV source.
///
/// Wraps `csv::Reader` and yields one `Result<Reservation>` per row, so a bad
/// row can be reported without abandoning the rest of the file.
pub struct ReservationReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> ReservationReader<R> {
    /// Creates a new `ReservationReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily deserializes rows and rebuilds each reservation's ledger.
    pub fn reservations(self) -> impl Iterator<Item = Result<Reservation>> {
        self.reader.into_deserialize().map(|result| {
            let record: ReservationRecord = result.map_err(BookingError::from)?;
            Reservation::try_from(record)
        })
    }
}
