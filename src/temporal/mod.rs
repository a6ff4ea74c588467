//! Date and date-time producers
//!
//! Temporal generators are thin adapters over the numeric engine: a distribution
//! produces step indices and the adapter turns each index into a calendar value.
//!
//! - [`DayGenerator`]: dates `min + i * granularity`
//! - [`DateTimeGenerator`]: a day from a [`DayGenerator`] combined with a time-of-day
//!   offset

pub mod datetime;
pub mod day;

pub use datetime::{DateTimeGenerator, DateTimeSpec};
pub use day::DayGenerator;

use crate::error::{GeneratorError, Result};
use chrono::{Days, Months, NaiveDate};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Calendar step of `years`, `months` and `days`
///
/// Parsed from and printed as `"y,m,d"`, e.g. `"0,0,7"` for weekly steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct DateGranularity {
    pub years: u32,
    pub months: u32,
    pub days: u32,
}

impl DateGranularity {
    pub fn new(years: u32, months: u32, days: u32) -> Self {
        Self { years, months, days }
    }

    pub fn days(days: u32) -> Self {
        Self::new(0, 0, days)
    }

    pub fn is_zero(&self) -> bool {
        self.years == 0 && self.months == 0 && self.days == 0
    }

    /// `start` advanced by `steps` granularities, `None` past the calendar range
    pub fn advance(&self, start: NaiveDate, steps: u64) -> Option<NaiveDate> {
        let months = (self.years as u64 * 12 + self.months as u64).checked_mul(steps)?;
        let days = (self.days as u64).checked_mul(steps)?;
        start
            .checked_add_months(Months::new(u32::try_from(months).ok()?))?
            .checked_add_days(Days::new(days))
    }

    /// Lower bound on the length of one step in days
    fn min_days(&self) -> u64 {
        self.years as u64 * 365 + self.months as u64 * 28 + self.days as u64
    }

    /// Largest `i` with `advance(min, i) <= max`
    pub(crate) fn last_step(&self, min: NaiveDate, max: NaiveDate) -> Result<u64> {
        if self.is_zero() {
            return Err(GeneratorError::config("date granularity must not be zero"));
        }
        if min > max {
            return Err(GeneratorError::config(format!(
                "min date {} is after max date {}",
                min, max
            )));
        }
        let span = (max - min).num_days() as u64;
        // Overestimate from the shortest possible step, then walk back
        let mut step = span / self.min_days();
        while step > 0 && self.advance(min, step).map_or(true, |d| d > max) {
            step -= 1;
        }
        Ok(step)
    }
}

impl FromStr for DateGranularity {
    type Err = GeneratorError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(GeneratorError::config(format!(
                "date granularity must have the form 'years,months,days', got '{}'",
                s
            )));
        }
        let mut numbers = [0u32; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            *slot = part.parse().map_err(|_| {
                GeneratorError::config(format!("invalid number '{}' in date granularity '{}'", part, s))
            })?;
        }
        Ok(Self::new(numbers[0], numbers[1], numbers[2]))
    }
}

impl TryFrom<String> for DateGranularity {
    type Error = GeneratorError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl fmt::Display for DateGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.years, self.months, self.days)
    }
}
