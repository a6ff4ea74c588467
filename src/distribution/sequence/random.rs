//! Uniform random sequence
//!
//! Every grid point has equal probability. In unique mode the sequence is a random
//! permutation of the grid, computed lazily with a sparse Fisher-Yates shuffle: only
//! the swapped positions are stored, so a unique draw of `k` values from a huge range
//! costs `O(k)` memory.

use super::{GridGenerator, IndexSequence};
use crate::distribution::{sample_by_index, Distribution};
use crate::error::Result;
use crate::generator::BoxedGenerator;
use crate::value::{Number, NumberSpec, Value};
use rand::Rng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::collections::HashMap;
use std::sync::Arc;

/// Uniform random distribution over the grid
#[derive(Debug, Clone, Default)]
pub struct RandomSequence;

impl RandomSequence {
    pub fn new() -> Self {
        Self
    }
}

impl Distribution for RandomSequence {
    fn name(&self) -> &str {
        "random"
    }

    fn create_number_generator(&self, spec: NumberSpec, unique: bool) -> Result<BoxedGenerator<Number>> {
        spec.validate()?;
        Ok(Box::new(GridGenerator::new(
            "RandomSequence",
            spec,
            RandomIndices::new(unique),
        )))
    }

    fn apply_to(self: Arc<Self>, source: BoxedGenerator<Value>, unique: bool) -> Result<BoxedGenerator<Value>> {
        sample_by_index(self, source, unique)
    }
}

/// Random grid indices, with or without replacement
#[derive(Debug)]
pub struct RandomIndices {
    unique: bool,
    count: u64,
    /// Number of indices drawn in this pass (unique mode)
    drawn: u64,
    /// Sparse permutation: position -> index currently stored there
    swaps: HashMap<u64, u64>,
}

impl RandomIndices {
    pub fn new(unique: bool) -> Self {
        Self {
            unique,
            count: 0,
            drawn: 0,
            swaps: HashMap::new(),
        }
    }
}

impl IndexSequence for RandomIndices {
    fn rewind(&mut self, spec: &NumberSpec, _rng: &mut Xoshiro256PlusPlus) -> Result<()> {
        self.count = spec.sample_count();
        self.drawn = 0;
        self.swaps.clear();
        Ok(())
    }

    fn next_index(&mut self, rng: &mut Xoshiro256PlusPlus) -> Option<u64> {
        if !self.unique {
            return Some(rng.gen_range(0..self.count));
        }
        if self.drawn >= self.count {
            return None;
        }

        let i = self.drawn;
        let j = rng.gen_range(i..self.count);
        let at_j = self.swaps.get(&j).copied().unwrap_or(j);
        let at_i = self.swaps.remove(&i).unwrap_or(i);
        if j != i {
            self.swaps.insert(j, at_i);
        }
        self.drawn += 1;
        Some(at_j)
    }
}
