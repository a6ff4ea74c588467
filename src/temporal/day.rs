//! Day generator

use super::DateGranularity;
use crate::distribution::Distribution;
use crate::error::{GeneratorError, Result};
use crate::generator::{BoxedGenerator, Generator, GeneratorContext, GeneratorState};
use crate::value::{Number, NumberSpec};
use chrono::NaiveDate;
use std::sync::Arc;

/// Dates `min + i * granularity` for step indices `i` chosen by a distribution
///
/// The distribution is asked for a number generator over `[0, steps]`, where `steps`
/// is the last index whose date does not pass `max`.
pub struct DayGenerator {
    min: NaiveDate,
    max: NaiveDate,
    granularity: DateGranularity,
    distribution: Arc<dyn Distribution>,
    unique: bool,
    steps: Option<BoxedGenerator<Number>>,
    state: GeneratorState,
}

impl DayGenerator {
    pub fn new(
        min: NaiveDate,
        max: NaiveDate,
        granularity: DateGranularity,
        distribution: Arc<dyn Distribution>,
        unique: bool,
    ) -> Self {
        Self {
            min,
            max,
            granularity,
            distribution,
            unique,
            steps: None,
            state: GeneratorState::Created,
        }
    }

    /// Number spec of the step indices
    pub fn step_spec(&self) -> Result<NumberSpec> {
        let last = self.granularity.last_step(self.min, self.max)?;
        let last = i64::try_from(last)
            .map_err(|_| GeneratorError::config(format!("too many date steps: {}", last)))?;
        Ok(NumberSpec::long(0, last, 1))
    }
}

impl Generator<NaiveDate> for DayGenerator {
    fn init(&mut self, context: &GeneratorContext) -> Result<()> {
        self.state.assert_created("DayGenerator")?;
        let mut steps = self.distribution.create_number_generator(self.step_spec()?, self.unique)?;
        steps.init(context)?;
        self.steps = Some(steps);
        self.state = GeneratorState::Running;
        Ok(())
    }

    fn generate(&mut self) -> Result<Option<NaiveDate>> {
        self.state.assert_running("DayGenerator")?;
        let step = match self.steps.as_mut() {
            Some(steps) => steps.generate()?,
            None => None,
        };
        match step {
            Some(i) => self
                .granularity
                .advance(self.min, i.as_i64().max(0) as u64)
                .map(Some)
                .ok_or_else(|| GeneratorError::illegal_state(format!("date step {} is out of range", i))),
            None => Ok(None),
        }
    }

    fn reset(&mut self) -> Result<()> {
        if self.state == GeneratorState::Created {
            return self.init(&GeneratorContext::default());
        }
        self.state.assert_not_closed("DayGenerator")?;
        match self.steps.as_mut() {
            Some(steps) => steps.reset(),
            None => Ok(()),
        }
    }

    fn close(&mut self) {
        if let Some(steps) = self.steps.as_mut() {
            steps.close();
        }
        self.state = GeneratorState::Closed;
    }

    fn state(&self) -> GeneratorState {
        self.state
    }

    fn is_parallelizable(&self) -> bool {
        self.steps.as_ref().map_or(true, |s| s.is_parallelizable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::sequence::{RandomSequence, StepSequence};
    use crate::generator::drain;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_step_with_calendar_granularity() {
        // One step spans 1 year 2 months 3 days, longer than the whole range
        let mut gen = DayGenerator::new(
            date(2010, 7, 6),
            date(2010, 8, 8),
            "1,2,3".parse().unwrap(),
            Arc::new(StepSequence::default()),
            false,
        );
        gen.init(&GeneratorContext::default()).unwrap();
        assert_eq!(drain(&mut gen, None).unwrap(), vec![date(2010, 7, 6)]);
        assert_eq!(gen.generate().unwrap(), None);

        gen.reset().unwrap();
        assert_eq!(drain(&mut gen, None).unwrap(), vec![date(2010, 7, 6)]);
    }

    #[test]
    fn test_step_combines_months_and_days() {
        let mut gen = DayGenerator::new(
            date(2010, 7, 6),
            date(2010, 12, 31),
            "0,1,3".parse().unwrap(),
            Arc::new(StepSequence::default()),
            false,
        );
        gen.init(&GeneratorContext::default()).unwrap();
        let expected = vec![
            date(2010, 7, 6),
            date(2010, 8, 9),
            date(2010, 9, 12),
            date(2010, 10, 15),
            date(2010, 11, 18),
            date(2010, 12, 21),
        ];
        let first = drain(&mut gen, None).unwrap();
        assert_eq!(first, expected);
        assert!(first.windows(2).all(|p| p[0] < p[1]));
        assert_eq!(gen.generate().unwrap(), None);

        gen.reset().unwrap();
        assert_eq!(drain(&mut gen, None).unwrap(), expected);
    }

    #[test]
    fn test_weekly_steps() {
        let mut gen = DayGenerator::new(
            date(2024, 1, 1),
            date(2024, 1, 31),
            DateGranularity::days(7),
            Arc::new(StepSequence::default()),
            false,
        );
        gen.init(&GeneratorContext::default()).unwrap();
        assert_eq!(
            drain(&mut gen, None).unwrap(),
            vec![
                date(2024, 1, 1),
                date(2024, 1, 8),
                date(2024, 1, 15),
                date(2024, 1, 22),
                date(2024, 1, 29)
            ]
        );
    }

    #[test]
    fn test_unique_random_days() {
        let mut gen = DayGenerator::new(
            date(2024, 2, 1),
            date(2024, 2, 29),
            DateGranularity::days(1),
            Arc::new(RandomSequence),
            true,
        );
        gen.init(&GeneratorContext::with_seed(30)).unwrap();
        let mut days = drain(&mut gen, None).unwrap();
        assert_eq!(days.len(), 29);
        days.sort();
        days.dedup();
        assert_eq!(days.len(), 29);
    }

    #[test]
    fn test_invalid_range() {
        let mut gen = DayGenerator::new(
            date(2024, 2, 1),
            date(2024, 1, 1),
            DateGranularity::days(1),
            Arc::new(StepSequence::default()),
            false,
        );
        assert!(matches!(
            gen.init(&GeneratorContext::default()),
            Err(GeneratorError::Config(_))
        ));
    }
}
