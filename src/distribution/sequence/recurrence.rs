//! Recurrence sequences
//!
//! Members of an integer recurrence that fall inside the range and on the grid, in
//! ascending order:
//!
//! - **Fibonacci**: `0, 1, 1, 2, 3, 5, 8, ...` with `F(n) = F(n-1) + F(n-2)`
//! - **Padovan**: `1, 1, 1, 2, 2, 3, 4, 5, 7, ...` with `P(n) = P(n-2) + P(n-3)`
//!
//! Both recurrences start with repeated members. In unique mode repeats are skipped.

use super::{GridGenerator, IndexSequence};
use crate::distribution::{sample_by_index, Distribution};
use crate::error::Result;
use crate::generator::BoxedGenerator;
use crate::value::{Number, NumberSpec, Value};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Recurrence {
    Fibonacci,
    Padovan,
}

impl Recurrence {
    fn initial_terms(self) -> [i128; 3] {
        match self {
            Recurrence::Fibonacci => [0, 1, 1],
            Recurrence::Padovan => [1, 1, 1],
        }
    }

    /// Shift the window of the last three terms by one
    ///
    /// Returns `false` once the next term no longer fits.
    fn advance(self, terms: &mut [i128; 3]) -> bool {
        let next = match self {
            Recurrence::Fibonacci => terms[1].checked_add(terms[2]),
            Recurrence::Padovan => terms[0].checked_add(terms[1]),
        };
        match next {
            Some(next) => {
                *terms = [terms[1], terms[2], next];
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FibonacciSequence;

#[derive(Debug, Clone, Default)]
pub struct PadovanSequence;

fn recurrence_generator(
    owner: &'static str,
    recurrence: Recurrence,
    spec: NumberSpec,
    unique: bool,
) -> Result<BoxedGenerator<Number>> {
    spec.validate()?;
    Ok(Box::new(GridGenerator::new(
        owner,
        spec,
        RecurrenceIndices {
            recurrence,
            unique,
            spec,
            terms: recurrence.initial_terms(),
            last: None,
            done: false,
        },
    )))
}

impl Distribution for FibonacciSequence {
    fn name(&self) -> &str {
        "fibonacci"
    }

    fn create_number_generator(&self, spec: NumberSpec, unique: bool) -> Result<BoxedGenerator<Number>> {
        recurrence_generator("FibonacciSequence", Recurrence::Fibonacci, spec, unique)
    }

    fn apply_to(self: Arc<Self>, source: BoxedGenerator<Value>, unique: bool) -> Result<BoxedGenerator<Value>> {
        sample_by_index(self, source, unique)
    }
}

impl Distribution for PadovanSequence {
    fn name(&self) -> &str {
        "padovan"
    }

    fn create_number_generator(&self, spec: NumberSpec, unique: bool) -> Result<BoxedGenerator<Number>> {
        recurrence_generator("PadovanSequence", Recurrence::Padovan, spec, unique)
    }

    fn apply_to(self: Arc<Self>, source: BoxedGenerator<Value>, unique: bool) -> Result<BoxedGenerator<Value>> {
        sample_by_index(self, source, unique)
    }
}

struct RecurrenceIndices {
    recurrence: Recurrence,
    unique: bool,
    spec: NumberSpec,
    terms: [i128; 3],
    last: Option<i128>,
    done: bool,
}

impl RecurrenceIndices {
    fn beyond_max(&self, term: i128) -> bool {
        match self.spec {
            NumberSpec::Long { max, .. } => term > max as i128,
            NumberSpec::Double { max, .. } => term as f64 > max,
        }
    }

    /// Grid index of `term`, if it lies on the grid
    fn grid_index(&self, term: i128) -> Option<u64> {
        match self.spec {
            NumberSpec::Long { min, granularity, .. } => {
                let offset = term - min as i128;
                if offset < 0 || offset % granularity as i128 != 0 {
                    return None;
                }
                Some((offset / granularity as i128) as u64)
            }
            NumberSpec::Double { granularity, .. } => {
                let x = term as f64;
                let index = self.spec.floor_index(x)?;
                let on_grid = (self.spec.value_at(index).as_f64() - x).abs() <= granularity * 1e-9;
                on_grid.then_some(index)
            }
        }
    }
}

impl IndexSequence for RecurrenceIndices {
    fn rewind(&mut self, spec: &NumberSpec, _rng: &mut Xoshiro256PlusPlus) -> Result<()> {
        self.spec = *spec;
        self.terms = self.recurrence.initial_terms();
        self.last = None;
        self.done = false;
        Ok(())
    }

    fn next_index(&mut self, _rng: &mut Xoshiro256PlusPlus) -> Option<u64> {
        while !self.done {
            let term = self.terms[0];
            if !self.recurrence.advance(&mut self.terms) || self.beyond_max(term) {
                self.done = true;
                break;
            }
            if self.unique && self.last == Some(term) {
                continue;
            }
            if let Some(index) = self.grid_index(term) {
                self.last = Some(term);
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

    #[test]
    fn test_fibonacci() {
        let values = longs(&FibonacciSequence, NumberSpec::long(0, 30, 1), false, 100);
        assert_eq!(values, vec![0, 1, 1, 2, 3, 5, 8, 13, 21]);
    }

    #[test]
    fn test_fibonacci_unique_on_grid() {
        let values = longs(&FibonacciSequence, NumberSpec::long(1, 100, 2), true, 100);
        // Odd members only, the repeated 1 once
        assert_eq!(values, vec![1, 3, 5, 13, 21, 55, 89]);
    }

    #[test]
    fn test_padovan() {
        let values = longs(&PadovanSequence, NumberSpec::long(0, 20, 1), false, 100);
        assert_eq!(values, vec![1, 1, 1, 2, 2, 3, 4, 5, 7, 9, 12, 16]);
        let unique = longs(&PadovanSequence, NumberSpec::long(2, 20, 1), true, 100);
        assert_eq!(unique, vec![2, 3, 4, 5, 7, 9, 12, 16]);
    }

    #[test]
    fn test_fibonacci_up_to_long_max() {
        let values = longs(&FibonacciSequence, NumberSpec::long(0, i64::MAX, 1), true, 1000);
        // F(92) is the largest Fibonacci number below 2^63
        assert_eq!(values.len(), 92);
        assert_eq!(*values.last().unwrap(), 7_540_113_804_746_346_429);
    }
}
