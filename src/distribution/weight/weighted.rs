//! Discretized weighted sampling
//!
//! At `init` the generator evaluates its weight function on every grid point
//! `min, min + granularity, ..., max` and builds a cumulative table normalized to
//! `[0, 1]`. Each `generate()` draws `u` in `[0, 1)` and binary-searches the table for
//! the first entry `>= u`, which gives `O(log n)` sampling.
//!
//! # Degenerate weights
//!
//! - a single grid point is returned with probability 1
//! - weights summing to zero fall back to a uniform distribution (with a warning)
//! - negative or non-finite weights are an `IllegalState` error

use crate::distribution::weight::WeightFunction;
use crate::error::{GeneratorError, Result};
use crate::generator::{Generator, GeneratorContext, GeneratorState};
use crate::value::{Number, NumberSpec};
use rand::Rng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Upper bound on the number of grid points a weight table is built for
pub const MAX_SAMPLE_POINTS: u64 = 10_000_000;

/// Primitive number type a weighted generator produces
pub trait GridNumber: Copy + Send + fmt::Display + 'static {
    fn spec(min: Self, max: Self, granularity: Self) -> NumberSpec;
    fn from_number(n: Number) -> Self;
}

impl GridNumber for i64 {
    fn spec(min: Self, max: Self, granularity: Self) -> NumberSpec {
        NumberSpec::long(min, max, granularity)
    }

    fn from_number(n: Number) -> Self {
        n.as_i64()
    }
}

impl GridNumber for f64 {
    fn spec(min: Self, max: Self, granularity: Self) -> NumberSpec {
        NumberSpec::double(min, max, granularity)
    }

    fn from_number(n: Number) -> Self {
        n.as_f64()
    }
}

/// Normalized cumulative sums of `weights`
///
/// Returns `Ok(None)` when all weights are zero.
pub(crate) fn cumulative_table(weights: &[f64]) -> Result<Option<Vec<f64>>> {
    let mut table = Vec::with_capacity(weights.len());
    let mut cumulative = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        if !w.is_finite() || w < 0.0 {
            return Err(GeneratorError::illegal_state(format!(
                "invalid weight {} at position {}",
                w, i
            )));
        }
        cumulative += w;
        table.push(cumulative);
    }
    if cumulative == 0.0 {
        return Ok(None);
    }
    for entry in &mut table {
        *entry /= cumulative;
    }
    // Guard against rounding so every u in [0, 1) finds an entry
    if let Some(last) = table.last_mut() {
        *last = 1.0;
    }
    Ok(Some(table))
}

/// Index of the first table entry `>= u`, clamped to the last index
pub(crate) fn lower_bound(table: &[f64], u: f64) -> usize {
    let index = match table.binary_search_by(|&c| {
        if c < u {
            std::cmp::Ordering::Less
        } else {
            std::cmp::Ordering::Greater
        }
    }) {
        Ok(i) => i,
        Err(i) => i,
    };
    index.min(table.len().saturating_sub(1))
}

/// Weighted generator over the grid of `[min, max]`
///
/// Use the [`WeightedLongGenerator`] and [`WeightedDoubleGenerator`] aliases.
pub struct WeightedNumberGenerator<N> {
    min: N,
    max: N,
    granularity: N,
    function: Arc<dyn WeightFunction>,
    spec: Option<NumberSpec>,
    /// `None` means uniform sampling (all weights zero)
    table: Option<Vec<f64>>,
    count: u64,
    rng: Option<Xoshiro256PlusPlus>,
    state: GeneratorState,
}

pub type WeightedLongGenerator = WeightedNumberGenerator<i64>;
pub type WeightedDoubleGenerator = WeightedNumberGenerator<f64>;

impl<N: GridNumber> WeightedNumberGenerator<N> {
    const OWNER: &'static str = "WeightedNumberGenerator";

    pub fn new(min: N, max: N, granularity: N, function: Arc<dyn WeightFunction>) -> Self {
        Self {
            min,
            max,
            granularity,
            function,
            spec: None,
            table: None,
            count: 0,
            rng: None,
            state: GeneratorState::Created,
        }
    }

    fn assert_configurable(&self, property: &str) -> Result<()> {
        if self.state != GeneratorState::Created {
            return Err(GeneratorError::config(format!(
                "{} cannot be changed after initialization",
                property
            )));
        }
        Ok(())
    }

    pub fn set_min(&mut self, min: N) -> Result<()> {
        self.assert_configurable("min")?;
        self.min = min;
        Ok(())
    }

    pub fn set_max(&mut self, max: N) -> Result<()> {
        self.assert_configurable("max")?;
        self.max = max;
        Ok(())
    }

    pub fn set_granularity(&mut self, granularity: N) -> Result<()> {
        self.assert_configurable("granularity")?;
        self.granularity = granularity;
        Ok(())
    }

    /// Normalized cumulative table, `None` before init or when sampling uniformly
    pub fn cumulative_probabilities(&self) -> Option<&[f64]> {
        self.table.as_deref()
    }
}

impl<N: GridNumber> Generator<N> for WeightedNumberGenerator<N> {
    fn init(&mut self, context: &GeneratorContext) -> Result<()> {
        self.state.assert_created(Self::OWNER)?;
        let spec = N::spec(self.min, self.max, self.granularity);
        spec.validate()?;

        let count = spec.sample_count();
        if count > MAX_SAMPLE_POINTS {
            return Err(GeneratorError::config(format!(
                "weight table for [{}, {}] by {} needs {} points, at most {} are supported",
                self.min, self.max, self.granularity, count, MAX_SAMPLE_POINTS
            )));
        }

        let weights: Vec<f64> = (0..count)
            .map(|i| self.function.value(spec.value_at(i).as_f64()))
            .collect();
        let table = cumulative_table(&weights)?;
        if table.is_none() {
            warn!(
                min = %self.min,
                max = %self.max,
                "weight function sums to zero, falling back to uniform sampling"
            );
        }
        debug!(points = count, "built weight table");

        self.spec = Some(spec);
        self.table = table;
        self.count = count;
        self.rng = Some(context.new_rng());
        self.state = GeneratorState::Running;
        Ok(())
    }

    fn generate(&mut self) -> Result<Option<N>> {
        self.state.assert_running(Self::OWNER)?;
        let (rng, spec) = match (self.rng.as_mut(), self.spec) {
            (Some(rng), Some(spec)) => (rng, spec),
            _ => return Ok(None),
        };
        let index = match &self.table {
            Some(table) => lower_bound(table, rng.gen::<f64>()) as u64,
            None => rng.gen_range(0..self.count),
        };
        Ok(Some(N::from_number(spec.value_at(index))))
    }

    fn reset(&mut self) -> Result<()> {
        if self.state == GeneratorState::Created {
            return self.init(&GeneratorContext::default());
        }
        self.state.assert_not_closed(Self::OWNER)
    }

    fn close(&mut self) {
        self.table = None;
        self.state = GeneratorState::Closed;
    }

    fn state(&self) -> GeneratorState {
        self.state
    }
}
