//! Shuffle sequence
//!
//! Interleaves the grid with a fixed stride: first every `increment`-th point starting
//! at offset 0, then the same starting at offset 1, and so on. Every point is visited
//! exactly once, so the sequence is unique by construction and depletes after one pass.

use super::{GridGenerator, IndexSequence};
use crate::distribution::{sample_by_index, Distribution};
use crate::error::{GeneratorError, Result};
use crate::generator::BoxedGenerator;
use crate::value::{Number, NumberSpec, Value};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::sync::Arc;

/// Deterministic stride shuffle
#[derive(Debug, Clone)]
pub struct ShuffleSequence {
    increment: u64,
}

impl ShuffleSequence {
    /// # Errors
    ///
    /// Fails with a `Config` error if `increment` is zero.
    pub fn new(increment: u64) -> Result<Self> {
        if increment == 0 {
            return Err(GeneratorError::config("shuffle increment must be positive"));
        }
        Ok(Self { increment })
    }

    pub fn increment(&self) -> u64 {
        self.increment
    }
}

impl Default for ShuffleSequence {
    fn default() -> Self {
        Self { increment: 2 }
    }
}

impl Distribution for ShuffleSequence {
    fn name(&self) -> &str {
        "shuffle"
    }

    fn create_number_generator(&self, spec: NumberSpec, _unique: bool) -> Result<BoxedGenerator<Number>> {
        spec.validate()?;
        Ok(Box::new(GridGenerator::new(
            "ShuffleSequence",
            spec,
            ShuffleIndices::new(self.increment),
        )))
    }

    fn apply_to(self: Arc<Self>, source: BoxedGenerator<Value>, unique: bool) -> Result<BoxedGenerator<Value>> {
        sample_by_index(self, source, unique)
    }
}

struct ShuffleIndices {
    increment: u64,
    count: u64,
    offset: u64,
    next: Option<u64>,
}

impl ShuffleIndices {
    fn new(increment: u64) -> Self {
        Self {
            increment,
            count: 0,
            offset: 0,
            next: None,
        }
    }
}

impl IndexSequence for ShuffleIndices {
    fn rewind(&mut self, spec: &NumberSpec, _rng: &mut Xoshiro256PlusPlus) -> Result<()> {
        self.count = spec.sample_count();
        self.offset = 0;
        self.next = Some(0);
        Ok(())
    }

    fn next_index(&mut self, _rng: &mut Xoshiro256PlusPlus) -> Option<u64> {
        let current = self.next?;
        self.next = match current.checked_add(self.increment) {
            Some(n) if n < self.count => Some(n),
            _ => {
                self.offset += 1;
                if self.offset < self.increment && self.offset < self.count {
                    Some(self.offset)
                } else {
                    None
                }
            }
        };
        Some(current)
    }
}
