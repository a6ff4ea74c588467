//! Increment sequence
//!
//! Yields the grid in ascending order: `min, min + g, ..., max`. When the end of the
//! range is reached, wraps back to `min`. In unique mode the sequence stops after one
//! pass instead.

use super::{GridGenerator, IndexSequence};
use crate::distribution::{sample_by_index, Distribution};
use crate::error::Result;
use crate::generator::BoxedGenerator;
use crate::value::{Number, NumberSpec, Value};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::sync::Arc;

/// Cyclic ascending sequence
#[derive(Debug, Clone, Default)]
pub struct IncrementSequence;

impl Distribution for IncrementSequence {
    fn name(&self) -> &str {
        "increment"
    }

    fn create_number_generator(&self, spec: NumberSpec, unique: bool) -> Result<BoxedGenerator<Number>> {
        spec.validate()?;
        Ok(Box::new(GridGenerator::new(
            "IncrementSequence",
            spec,
            IncrementIndices {
                unique,
                count: 0,
                current: None,
            },
        )))
    }

    fn apply_to(self: Arc<Self>, source: BoxedGenerator<Value>, unique: bool) -> Result<BoxedGenerator<Value>> {
        sample_by_index(self, source, unique)
    }
}

struct IncrementIndices {
    unique: bool,
    count: u64,
    /// Next index to emit
    current: Option<u64>,
}

impl IndexSequence for IncrementIndices {
    fn rewind(&mut self, spec: &NumberSpec, _rng: &mut Xoshiro256PlusPlus) -> Result<()> {
        self.count = spec.sample_count();
        self.current = Some(0);
        Ok(())
    }

    fn next_index(&mut self, _rng: &mut Xoshiro256PlusPlus) -> Option<u64> {
        let index = self.current?;

        // Wrap around once the last grid point has been emitted
        let next = index + 1;
        self.current = if next < self.count {
            Some(next)
        } else if self.unique {
            None
        } else {
            Some(0)
        };
        Some(index)
    }
}
