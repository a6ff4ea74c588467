//! Bit-reverse sequence
//!
//! Visits grid index `i` in the order of its bit-reversed counter, which spreads
//! consecutive values evenly over the range: for 8 points the order is
//! `0, 4, 2, 6, 1, 5, 3, 7`. Counters that reverse to an index past the end are
//! skipped, so every index is visited exactly once.

use super::{GridGenerator, IndexSequence};
use crate::distribution::{sample_by_index, Distribution};
use crate::error::Result;
use crate::generator::BoxedGenerator;
use crate::value::{Number, NumberSpec, Value};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct BitReverseSequence;

impl Distribution for BitReverseSequence {
    fn name(&self) -> &str {
        "bitreverse"
    }

    fn create_number_generator(&self, spec: NumberSpec, _unique: bool) -> Result<BoxedGenerator<Number>> {
        spec.validate()?;
        Ok(Box::new(GridGenerator::new(
            "BitReverseSequence",
            spec,
            BitReverseIndices {
                count: 0,
                bits: 0,
                counter: 0,
            },
        )))
    }

    fn apply_to(self: Arc<Self>, source: BoxedGenerator<Value>, unique: bool) -> Result<BoxedGenerator<Value>> {
        sample_by_index(self, source, unique)
    }
}

struct BitReverseIndices {
    count: u64,
    bits: u32,
    counter: u128,
}

impl BitReverseIndices {
    fn reverse(&self, value: u64) -> u64 {
        if self.bits == 0 {
            0
        } else {
            value.reverse_bits() >> (64 - self.bits)
        }
    }
}

impl IndexSequence for BitReverseIndices {
    fn rewind(&mut self, spec: &NumberSpec, _rng: &mut Xoshiro256PlusPlus) -> Result<()> {
        self.count = spec.sample_count();
        self.bits = 64 - (self.count - 1).leading_zeros();
        self.counter = 0;
        Ok(())
    }

    fn next_index(&mut self, _rng: &mut Xoshiro256PlusPlus) -> Option<u64> {
        let end = 1u128 << self.bits;
        while self.counter < end {
            let index = self.reverse(self.counter as u64);
            self.counter += 1;
            if index < self.count {
                return Some(index);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::sequence::test_support::longs;
    use std::collections::HashSet;

    #[test]
    fn test_power_of_two() {
        let values = longs(&BitReverseSequence, NumberSpec::long(0, 7, 1), false, 100);
        assert_eq!(values, vec![0, 4, 2, 6, 1, 5, 3, 7]);
    }

    #[test]
    fn test_skips_out_of_range() {
        let values = longs(&BitReverseSequence, NumberSpec::long(0, 5, 1), false, 100);
        assert_eq!(values, vec![0, 4, 2, 1, 5, 3]);
    }

    #[test]
    fn test_visits_every_point_once() {
        let values = longs(&BitReverseSequence, NumberSpec::long(10, 1000, 10), true, 1000);
        assert_eq!(values.len(), 100);
        let distinct: HashSet<i64> = values.iter().copied().collect();
        assert_eq!(distinct.len(), 100);
    }

    #[test]
    fn test_single_point() {
        assert_eq!(longs(&BitReverseSequence, NumberSpec::long(3, 3, 1), false, 100), vec![3]);
    }
}
