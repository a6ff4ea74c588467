//! Random walk sequence
//!
//! Starts at `initial` (default `min`) and moves by a random number of grid steps in
//! `[min_step, max_step]` per value. Leaving the range wraps around to the other end.
//! With strictly positive steps the walk is monotone, so in unique mode it stops at
//! `max` instead of wrapping.

use super::{GridGenerator, IndexSequence};
use crate::distribution::{sample_by_index, Distribution};
use crate::error::{GeneratorError, Result};
use crate::generator::BoxedGenerator;
use crate::value::{Number, NumberSpec, Value};
use rand::Rng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct RandomWalkSequence {
    initial: Option<f64>,
    min_step: i64,
    max_step: i64,
}

impl RandomWalkSequence {
    /// Walk with steps of `min_step..=max_step` grid points
    ///
    /// # Errors
    ///
    /// Fails with a `Config` error if `min_step > max_step`.
    pub fn new(min_step: i64, max_step: i64) -> Result<Self> {
        if min_step > max_step {
            return Err(GeneratorError::config(format!(
                "min_step ({}) must not be greater than max_step ({})",
                min_step, max_step
            )));
        }
        Ok(Self {
            initial: None,
            min_step,
            max_step,
        })
    }

    pub fn with_initial(mut self, initial: f64) -> Self {
        self.initial = Some(initial);
        self
    }
}

impl Default for RandomWalkSequence {
    fn default() -> Self {
        Self {
            initial: None,
            min_step: -1,
            max_step: 1,
        }
    }
}

impl Distribution for RandomWalkSequence {
    fn name(&self) -> &str {
        "randomWalk"
    }

    fn create_number_generator(&self, spec: NumberSpec, unique: bool) -> Result<BoxedGenerator<Number>> {
        spec.validate()?;
        self.check_apply(unique)?;
        let start = match self.initial {
            Some(x) => spec.floor_index(x).ok_or_else(|| {
                GeneratorError::config(format!(
                    "initial value {} is outside [{}, {}]",
                    x,
                    spec.min(),
                    spec.max()
                ))
            })?,
            None => 0,
        };
        Ok(Box::new(GridGenerator::new(
            "RandomWalkSequence",
            spec,
            WalkIndices {
                start,
                min_step: self.min_step,
                max_step: self.max_step,
                unique,
                count: 0,
                current: None,
            },
        )))
    }

    fn check_apply(&self, unique: bool) -> Result<()> {
        if unique && self.min_step <= 0 {
            return Err(GeneratorError::config(format!(
                "random walk can only be unique with a positive min_step, got {}",
                self.min_step
            )));
        }
        Ok(())
    }

    fn apply_to(self: Arc<Self>, source: BoxedGenerator<Value>, unique: bool) -> Result<BoxedGenerator<Value>> {
        sample_by_index(self, source, unique)
    }
}

struct WalkIndices {
    start: u64,
    min_step: i64,
    max_step: i64,
    unique: bool,
    count: u64,
    current: Option<i128>,
}

impl IndexSequence for WalkIndices {
    fn rewind(&mut self, spec: &NumberSpec, _rng: &mut Xoshiro256PlusPlus) -> Result<()> {
        self.count = spec.sample_count();
        self.current = Some(self.start as i128);
        Ok(())
    }

    fn next_index(&mut self, rng: &mut Xoshiro256PlusPlus) -> Option<u64> {
        let current = self.current?;
        let step = rng.gen_range(self.min_step..=self.max_step) as i128;
        let next = current + step;
        let count = self.count as i128;
        self.current = if self.unique {
            (next < count).then_some(next)
        } else {
            Some(next.rem_euclid(count))
        };
        Some(current as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::sequence::test_support::longs;

    #[test]
    fn test_walk_moves_by_single_steps() {
        let values = longs(&RandomWalkSequence::default(), NumberSpec::long(0, 100, 1), false, 500);
        assert_eq!(values[0], 0);
        for pair in values.windows(2) {
            let diff = (pair[1] - pair[0]).abs();
            // A wrap jumps between the two ends of the range
            assert!(diff <= 1 || diff == 100, "jump from {} to {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_walk_starts_at_initial() {
        let walk = RandomWalkSequence::new(-2, 2).unwrap().with_initial(50.0);
        let values = longs(&walk, NumberSpec::long(0, 100, 10), false, 10);
        assert_eq!(values[0], 50);
        assert!(values.iter().all(|v| v % 10 == 0));
    }

    #[test]
    fn test_unique_walk_is_increasing_and_depletes() {
        let walk = RandomWalkSequence::new(1, 3).unwrap();
        let values = longs(&walk, NumberSpec::long(0, 50, 1), true, 1000);
        assert!(values.windows(2).all(|p| p[1] > p[0]));
        assert!(*values.last().unwrap() <= 50);
        assert!(values.len() >= 17);
    }

    #[test]
    fn test_unique_requires_positive_steps() {
        let result = RandomWalkSequence::default().create_number_generator(NumberSpec::long(0, 9, 1), true);
        assert!(matches!(result, Err(GeneratorError::Config(_))));
        assert!(RandomWalkSequence::new(3, 1).is_err());
    }
}
