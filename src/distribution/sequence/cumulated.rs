//! Cumulated sequence
//!
//! Each value is the mean of several uniform draws over the range, snapped to the grid.
//! The sum of uniform variables approaches a normal distribution, so values cluster
//! around the middle of the range.

use super::{GridGenerator, IndexSequence};
use crate::distribution::{sample_by_index, Distribution};
use crate::error::{GeneratorError, Result};
use crate::generator::BoxedGenerator;
use crate::value::{Number, NumberSpec, Value};
use rand::Rng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::sync::Arc;

const DEFAULT_DRAWS: u32 = 5;

/// Bell-shaped distribution built from averaged uniform draws
#[derive(Debug, Clone)]
pub struct CumulatedSequence {
    draws: u32,
}

impl CumulatedSequence {
    /// # Errors
    ///
    /// Fails with a `Config` error if `draws` is zero.
    pub fn with_draws(draws: u32) -> Result<Self> {
        if draws == 0 {
            return Err(GeneratorError::config("cumulated needs at least one draw"));
        }
        Ok(Self { draws })
    }
}

impl Default for CumulatedSequence {
    fn default() -> Self {
        Self { draws: DEFAULT_DRAWS }
    }
}

impl Distribution for CumulatedSequence {
    fn name(&self) -> &str {
        "cumulated"
    }

    fn create_number_generator(&self, spec: NumberSpec, unique: bool) -> Result<BoxedGenerator<Number>> {
        self.check_apply(unique)?;
        spec.validate()?;
        Ok(Box::new(GridGenerator::new(
            "CumulatedSequence",
            spec,
            CumulatedIndices {
                draws: self.draws,
                count: 0,
            },
        )))
    }

    fn check_apply(&self, unique: bool) -> Result<()> {
        if unique {
            return Err(GeneratorError::config(
                "cumulated distribution cannot generate unique values",
            ));
        }
        Ok(())
    }

    fn apply_to(self: Arc<Self>, source: BoxedGenerator<Value>, unique: bool) -> Result<BoxedGenerator<Value>> {
        sample_by_index(self, source, unique)
    }
}

struct CumulatedIndices {
    draws: u32,
    count: u64,
}

impl IndexSequence for CumulatedIndices {
    fn rewind(&mut self, spec: &NumberSpec, _rng: &mut Xoshiro256PlusPlus) -> Result<()> {
        self.count = spec.sample_count();
        Ok(())
    }

    fn next_index(&mut self, rng: &mut Xoshiro256PlusPlus) -> Option<u64> {
        let sum: f64 = (0..self.draws).map(|_| rng.gen::<f64>()).sum();
        let mean = sum / self.draws as f64;
        // Map [0, 1) onto the grid points, each owning an equal slice
        let index = (mean * self.count as f64) as u64;
        Some(index.min(self.count - 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::sequence::test_support::longs;

    #[test]
    fn test_cumulated_within_range() {
        let values = longs(&CumulatedSequence::default(), NumberSpec::long(-10, 10, 2), false, 1000);
        for v in values {
            assert!((-10..=10).contains(&v));
            assert_eq!(v % 2, 0);
        }
    }

    #[test]
    fn test_cumulated_clusters_in_middle() {
        let values = longs(&CumulatedSequence::default(), NumberSpec::long(0, 99, 1), false, 10_000);
        let middle = values.iter().filter(|&&v| (25..75).contains(&v)).count();
        let edges = values.iter().filter(|&&v| v < 10 || v >= 90).count();
        // Uniform would put 50% in the middle half and 20% in the outer tenths
        assert!(middle > 7000, "middle count {}", middle);
        assert!(edges < 500, "edge count {}", edges);
    }

    #[test]
    fn test_unique_rejected() {
        let result = CumulatedSequence::default().create_number_generator(NumberSpec::long(0, 9, 1), true);
        assert!(matches!(result, Err(GeneratorError::Config(_))));
    }

    #[test]
    fn test_zero_draws_rejected() {
        assert!(CumulatedSequence::with_draws(0).is_err());
    }
}
