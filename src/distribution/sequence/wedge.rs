//! Wedge sequence: `min, max, min + g, max - g, ...` converging to the middle

use super::{GridGenerator, IndexSequence};
use crate::distribution::{sample_by_index, Distribution};
use crate::error::Result;
use crate::generator::BoxedGenerator;
use crate::value::{Number, NumberSpec, Value};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct WedgeSequence;

impl Distribution for WedgeSequence {
    fn name(&self) -> &str {
        "wedge"
    }

    fn create_number_generator(&self, spec: NumberSpec, _unique: bool) -> Result<BoxedGenerator<Number>> {
        spec.validate()?;
        Ok(Box::new(GridGenerator::new(
            "WedgeSequence",
            spec,
            WedgeIndices {
                low: 0,
                high: 0,
                from_low: true,
                done: true,
            },
        )))
    }

    fn apply_to(self: Arc<Self>, source: BoxedGenerator<Value>, unique: bool) -> Result<BoxedGenerator<Value>> {
        sample_by_index(self, source, unique)
    }
}

struct WedgeIndices {
    low: u64,
    high: u64,
    from_low: bool,
    done: bool,
}

impl IndexSequence for WedgeIndices {
    fn rewind(&mut self, spec: &NumberSpec, _rng: &mut Xoshiro256PlusPlus) -> Result<()> {
        self.low = 0;
        self.high = spec.sample_count() - 1;
        self.from_low = true;
        self.done = false;
        Ok(())
    }

    fn next_index(&mut self, _rng: &mut Xoshiro256PlusPlus) -> Option<u64> {
        if self.done {
            return None;
        }
        let index = if self.from_low { self.low } else { self.high };
        if self.low == self.high {
            self.done = true;
        } else if self.from_low {
            self.low += 1;
        } else {
            self.high -= 1;
        }
        self.from_low = !self.from_low;
        Some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::sequence::test_support::longs;

    #[test]
    fn test_wedge_odd_count() {
        let values = longs(&WedgeSequence, NumberSpec::long(1, 5, 1), false, 100);
        assert_eq!(values, vec![1, 5, 2, 4, 3]);
    }

    #[test]
    fn test_wedge_even_count_with_granularity() {
        let values = longs(&WedgeSequence, NumberSpec::long(0, 30, 10), true, 100);
        assert_eq!(values, vec![0, 30, 10, 20]);
    }

    #[test]
    fn test_wedge_single_point() {
        assert_eq!(longs(&WedgeSequence, NumberSpec::long(7, 7, 1), false, 100), vec![7]);
    }
}
