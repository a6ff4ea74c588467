//! Step sequence
//!
//! Walks the grid with a constant stride of `delta` grid points. A positive delta
//! starts at `min` (or `initial`) and climbs, a negative one starts at `max` and
//! descends. The walk ends when it leaves the range or passes `limit`.

use super::{GridGenerator, IndexSequence};
use crate::distribution::{sample_by_index, Distribution};
use crate::error::{GeneratorError, Result};
use crate::generator::BoxedGenerator;
use crate::value::{Number, NumberSpec, Value};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::sync::Arc;

/// Constant-stride walk over the grid
#[derive(Debug, Clone)]
pub struct StepSequence {
    delta: i64,
    initial: Option<f64>,
    limit: Option<f64>,
}

impl StepSequence {
    /// Step by `delta` grid points per value
    pub fn new(delta: i64) -> Self {
        Self {
            delta,
            initial: None,
            limit: None,
        }
    }

    /// First value of the walk; must lie inside the grid range
    pub fn with_initial(mut self, initial: f64) -> Self {
        self.initial = Some(initial);
        self
    }

    /// Last value the walk may reach (upper for ascending, lower for descending walks)
    pub fn with_limit(mut self, limit: f64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn delta(&self) -> i64 {
        self.delta
    }
}

impl Default for StepSequence {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Distribution for StepSequence {
    fn name(&self) -> &str {
        "step"
    }

    fn create_number_generator(&self, spec: NumberSpec, unique: bool) -> Result<BoxedGenerator<Number>> {
        spec.validate()?;
        self.check_apply(unique)?;
        if let Some(initial) = self.initial {
            if spec.floor_index(initial).is_none() {
                return Err(GeneratorError::config(format!(
                    "initial value {} is outside [{}, {}]",
                    initial,
                    spec.min(),
                    spec.max()
                )));
            }
        }
        Ok(Box::new(GridGenerator::new(
            "StepSequence",
            spec,
            StepIndices {
                delta: self.delta,
                initial: self.initial,
                limit: self.limit,
                low: 0,
                high: 0,
                current: 0,
            },
        )))
    }

    fn is_open_ended(&self) -> bool {
        self.delta > 0 && self.limit.is_none()
    }

    fn check_apply(&self, unique: bool) -> Result<()> {
        if unique && self.delta == 0 {
            return Err(GeneratorError::config(
                "step with delta 0 cannot produce unique values",
            ));
        }
        Ok(())
    }

    fn apply_to(self: Arc<Self>, source: BoxedGenerator<Value>, unique: bool) -> Result<BoxedGenerator<Value>> {
        sample_by_index(self, source, unique)
    }
}

struct StepIndices {
    delta: i64,
    initial: Option<f64>,
    limit: Option<f64>,
    low: i128,
    high: i128,
    current: i128,
}

impl IndexSequence for StepIndices {
    fn rewind(&mut self, spec: &NumberSpec, _rng: &mut Xoshiro256PlusPlus) -> Result<()> {
        self.low = 0;
        self.high = spec.sample_count() as i128 - 1;

        if let Some(limit) = self.limit {
            let max = spec.max().as_f64();
            let min = spec.min().as_f64();
            if self.delta >= 0 {
                self.high = match spec.floor_index(limit.min(max)) {
                    Some(i) => self.high.min(i as i128),
                    None => -1,
                };
            } else if let Some(i) = spec.floor_index(limit.max(min)) {
                // First grid point at or above the limit
                let at = spec.value_at(i).as_f64();
                self.low = if at < limit { i as i128 + 1 } else { i as i128 };
            } else {
                self.low = self.high + 1;
            }
        }

        self.current = match self.initial.and_then(|x| spec.floor_index(x)) {
            Some(i) => i as i128,
            None if self.delta < 0 => self.high,
            None => self.low,
        };
        Ok(())
    }

    fn next_index(&mut self, _rng: &mut Xoshiro256PlusPlus) -> Option<u64> {
        if self.current < self.low || self.current > self.high {
            return None;
        }
        let index = self.current as u64;
        self.current += self.delta as i128;
        Some(index)
    }
}
