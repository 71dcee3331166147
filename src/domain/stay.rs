use crate::error::BookingError;
use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

const SECONDS_PER_DAY: i64 = 86_400;

/// A half-open stay interval `[check_in, check_out)`.
///
/// The check-out day is not occupied by the stay: the room is released that
/// morning for the same night's arrivals. A `Stay` always spans at least one
/// night.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawStay")]
pub struct Stay {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

#[derive(Deserialize)]
struct RawStay {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

impl TryFrom<RawStay> for Stay {
    type Error = BookingError;

    fn try_from(raw: RawStay) -> Result<Self, Self::Error> {
        Self::new(raw.check_in, raw.check_out)
    }
}

impl Stay {
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self, BookingError> {
        if check_out <= check_in {
            return Err(BookingError::InvalidDateRange {
                reason: format!("check-out {check_out} must be after check-in {check_in}"),
            });
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    /// Builds a stay from timestamps, rounding any partial day up to a full
    /// night.
    pub fn from_timestamps(
        arrival: NaiveDateTime,
        departure: NaiveDateTime,
    ) -> Result<Self, BookingError> {
        let seconds = (departure - arrival).num_seconds();
        if seconds <= 0 {
            return Err(BookingError::InvalidDateRange {
                reason: format!("departure {departure} must be after arrival {arrival}"),
            });
        }
        let nights = (seconds + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY;
        let check_in = arrival.date();
        let check_out = check_in
            .checked_add_days(Days::new(nights as u64))
            .ok_or_else(|| BookingError::InvalidDateRange {
                reason: format!("departure {departure} is out of range"),
            })?;
        Self::new(check_in, check_out)
    }

    /// Builds a stay from two instants. Plain days are taken as-is; when
    /// either end carries a time, a day means midnight and partial days
    /// round up.
    pub fn between(arrival: StayInstant, departure: StayInstant) -> Result<Self, BookingError> {
        match (arrival, departure) {
            (StayInstant::Day(check_in), StayInstant::Day(check_out)) => {
                Self::new(check_in, check_out)
            }
            (arrival, departure) => Self::from_timestamps(arrival.at(), departure.at()),
        }
    }

    pub fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    pub fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    pub fn nights(&self) -> u32 {
        (self.check_out - self.check_in).num_days() as u32
    }

    /// Whether the stay occupies a room on `day`.
    pub fn occupies(&self, day: NaiveDate) -> bool {
        self.check_in <= day && day < self.check_out
    }

    /// The occupied days, check-out excluded.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let check_out = self.check_out;
        self.check_in.iter_days().take_while(move |d| *d < check_out)
    }

    /// The inclusive range of nights this stay occupies.
    pub fn occupied_range(&self) -> DateRange {
        DateRange {
            start: self.check_in,
            end: self.check_out.pred_opt().unwrap_or(self.check_in),
        }
    }
}

/// A check-in or check-out given either as a day or as a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StayInstant {
    Day(NaiveDate),
    At(NaiveDateTime),
}

impl StayInstant {
    fn at(self) -> NaiveDateTime {
        match self {
            Self::Day(day) => day.and_time(NaiveTime::MIN),
            Self::At(at) => at,
        }
    }
}

impl FromStr for StayInstant {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(day) = s.parse::<NaiveDate>() {
            return Ok(Self::Day(day));
        }
        s.parse::<NaiveDateTime>()
            .map(Self::At)
            .map_err(|_| BookingError::InvalidDateRange {
                reason: format!("'{s}' is neither a date nor a date-time"),
            })
    }
}

/// An inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, BookingError> {
        if end < start {
            return Err(BookingError::InvalidDateRange {
                reason: format!("range end {end} is before start {start}"),
            });
        }
        Ok(Self { start, end })
    }

    pub fn single(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    /// `days` days starting at `start`, both ends included.
    pub fn window(start: NaiveDate, days: u32) -> Self {
        Self {
            start,
            end: start
                .checked_add_days(Days::new(u64::from(days)))
                .unwrap_or(NaiveDate::MAX),
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

impl From<NaiveDate> for DateRange {
    fn from(day: NaiveDate) -> Self {
        Self::single(day)
    }
}
