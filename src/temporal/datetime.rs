//! Date-time generator
//!
//! Combines a day from a [`DayGenerator`] with a time-of-day offset. Days and times
//! come from independent distributions; either part running out depletes the whole.
//!
//! Times stay inside `[min_time, max_time]`. The one exception is a zero-width window
//! (`min_time == max_time`) combined with an open-ended time strategy such as a forward
//! `step`: the walk then starts at `min_time` and runs on towards the end of the day, so
//! consecutive values read `08:00:00, 08:00:01, ...`.

use super::{DateGranularity, DayGenerator};
use crate::distribution::Distribution;
use crate::error::{GeneratorError, Result};
use crate::generator::{BoxedGenerator, Generator, GeneratorContext, GeneratorState};
use crate::value::{Number, NumberSpec};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::sync::Arc;

const LAST_SECOND_OF_DAY: i64 = 86_399;

/// Bounds and steps of a date-time generator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateTimeSpec {
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
    pub date_granularity: DateGranularity,
    pub min_time: NaiveTime,
    pub max_time: NaiveTime,
    /// Time step in seconds
    pub time_granularity: i64,
}

impl DateTimeSpec {
    /// Seconds-from-midnight spec of the time offsets
    ///
    /// `open_ended` lets a zero-width window extend to the last second of the day.
    pub fn time_spec(&self, open_ended: bool) -> Result<NumberSpec> {
        if self.time_granularity <= 0 {
            return Err(GeneratorError::config(format!(
                "time granularity must be positive, got {}",
                self.time_granularity
            )));
        }
        if self.min_time > self.max_time {
            return Err(GeneratorError::config(format!(
                "min time {} is after max time {}",
                self.min_time, self.max_time
            )));
        }
        let min = self.min_time.num_seconds_from_midnight() as i64;
        let max = if open_ended && self.min_time == self.max_time {
            LAST_SECOND_OF_DAY
        } else {
            self.max_time.num_seconds_from_midnight() as i64
        };
        Ok(NumberSpec::long(min, max, self.time_granularity))
    }
}

pub struct DateTimeGenerator {
    spec: DateTimeSpec,
    days: DayGenerator,
    time_distribution: Arc<dyn Distribution>,
    unique: bool,
    times: Option<BoxedGenerator<Number>>,
    state: GeneratorState,
}

impl DateTimeGenerator {
    pub fn new(
        spec: DateTimeSpec,
        day_distribution: Arc<dyn Distribution>,
        time_distribution: Arc<dyn Distribution>,
        unique: bool,
    ) -> Self {
        Self {
            days: DayGenerator::new(spec.min_date, spec.max_date, spec.date_granularity, day_distribution, unique),
            spec,
            time_distribution,
            unique,
            times: None,
            state: GeneratorState::Created,
        }
    }
}

impl Generator<NaiveDateTime> for DateTimeGenerator {
    fn init(&mut self, context: &GeneratorContext) -> Result<()> {
        self.state.assert_created("DateTimeGenerator")?;
        let mut times = self
            .time_distribution
            .create_number_generator(self.spec.time_spec(self.time_distribution.is_open_ended())?, self.unique)?;
        self.days.init(context)?;
        times.init(context)?;
        self.times = Some(times);
        self.state = GeneratorState::Running;
        Ok(())
    }

    fn generate(&mut self) -> Result<Option<NaiveDateTime>> {
        self.state.assert_running("DateTimeGenerator")?;
        let day = match self.days.generate()? {
            Some(day) => day,
            None => return Ok(None),
        };
        let seconds = match self.times.as_mut() {
            Some(times) => match times.generate()? {
                Some(n) => n.as_i64(),
                None => return Ok(None),
            },
            None => return Ok(None),
        };
        let time = u32::try_from(seconds)
            .ok()
            .and_then(|s| NaiveTime::from_num_seconds_from_midnight_opt(s, 0))
            .ok_or_else(|| GeneratorError::illegal_state(format!("time offset {} is out of range", seconds)))?;
        Ok(Some(day.and_time(time)))
    }

    fn reset(&mut self) -> Result<()> {
        if self.state == GeneratorState::Created {
            return self.init(&GeneratorContext::default());
        }
        self.state.assert_not_closed("DateTimeGenerator")?;
        self.days.reset()?;
        match self.times.as_mut() {
            Some(times) => times.reset(),
            None => Ok(()),
        }
    }

    fn close(&mut self) {
        self.days.close();
        if let Some(times) = self.times.as_mut() {
            times.close();
        }
        self.state = GeneratorState::Closed;
    }

    fn state(&self) -> GeneratorState {
        self.state
    }

    fn is_parallelizable(&self) -> bool {
        self.days.is_parallelizable() && self.times.as_ref().map_or(true, |t| t.is_parallelizable())
    }
}
