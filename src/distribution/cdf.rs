//! Continuous sampling by inverse cumulative distribution function
//!
//! A number generator over `[min, max]` with granularity `g` computes
//!
//! ```text
//! min_prob   = F(min)
//! prob_scale = F(max + g) - min_prob
//! p          ~ uniform in [min_prob, min_prob + prob_scale)
//! x          = F⁻¹(p), snapped down to the grid from min and clamped to max
//! ```
//!
//! Extending the probability window to `max + g` gives the last grid point the full
//! width of its cell. Continuous sampling offers no way to avoid repeats, so
//! `unique = true` is rejected with `Unsupported` by both operations.

use crate::distribution::{sample_by_index, Distribution};
use crate::error::{GeneratorError, Result};
use crate::generator::{BoxedGenerator, Generator, GeneratorContext, GeneratorState};
use crate::value::{Number, NumberSpec, Value};
use rand::Rng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::fmt;
use std::sync::Arc;

/// Cumulative distribution function with a known inverse
pub trait CumulativeDistributionFunction: Send + Sync + fmt::Debug {
    /// `P(X <= x)`
    fn cumulative_probability(&self, x: f64) -> f64;

    /// Smallest `x` with `cumulative_probability(x) >= p`
    fn inverse(&self, p: f64) -> f64;
}

/// Exponential distribution with rate `lambda`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialCdf {
    lambda: f64,
}

impl ExponentialCdf {
    /// # Errors
    ///
    /// Fails with a `Config` error unless `lambda` is positive and finite.
    pub fn new(lambda: f64) -> Result<Self> {
        if !(lambda > 0.0) || !lambda.is_finite() {
            return Err(GeneratorError::config(format!(
                "exponential rate must be positive, got {}",
                lambda
            )));
        }
        Ok(Self { lambda })
    }
}

impl CumulativeDistributionFunction for ExponentialCdf {
    fn cumulative_probability(&self, x: f64) -> f64 {
        if x <= 0.0 {
            0.0
        } else {
            1.0 - (-self.lambda * x).exp()
        }
    }

    fn inverse(&self, p: f64) -> f64 {
        -(1.0 - p).ln() / self.lambda
    }
}

/// Pareto distribution with minimum `scale` and tail index `shape`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParetoCdf {
    scale: f64,
    shape: f64,
}

impl ParetoCdf {
    /// # Errors
    ///
    /// Fails with a `Config` error unless both parameters are positive and finite.
    pub fn new(scale: f64, shape: f64) -> Result<Self> {
        if !(scale > 0.0) || !(shape > 0.0) || !scale.is_finite() || !shape.is_finite() {
            return Err(GeneratorError::config(format!(
                "pareto scale and shape must be positive, got {} and {}",
                scale, shape
            )));
        }
        Ok(Self { scale, shape })
    }
}

impl CumulativeDistributionFunction for ParetoCdf {
    fn cumulative_probability(&self, x: f64) -> f64 {
        if x <= self.scale {
            0.0
        } else {
            1.0 - (self.scale / x).powf(self.shape)
        }
    }

    fn inverse(&self, p: f64) -> f64 {
        self.scale / (1.0 - p).powf(1.0 / self.shape)
    }
}

/// Distribution backed by a cumulative distribution function
#[derive(Debug)]
pub struct CdfDistribution<F> {
    function: Arc<F>,
}

impl<F: CumulativeDistributionFunction + 'static> CdfDistribution<F> {
    pub fn new(function: F) -> Self {
        Self {
            function: Arc::new(function),
        }
    }
}

impl<F: CumulativeDistributionFunction + 'static> Distribution for CdfDistribution<F> {
    fn name(&self) -> &str {
        "cdf"
    }

    fn create_number_generator(&self, spec: NumberSpec, unique: bool) -> Result<BoxedGenerator<Number>> {
        self.check_apply(unique)?;
        spec.validate()?;
        let function: Arc<dyn CumulativeDistributionFunction> = self.function.clone();
        Ok(Box::new(CdfGenerator::new(spec, function)))
    }

    fn check_apply(&self, unique: bool) -> Result<()> {
        if unique {
            return Err(GeneratorError::unsupported(
                "cumulative distribution functions cannot generate unique values",
            ));
        }
        Ok(())
    }

    fn apply_to(self: Arc<Self>, source: BoxedGenerator<Value>, unique: bool) -> Result<BoxedGenerator<Value>> {
        sample_by_index(self, source, unique)
    }
}

/// Numeric generator sampling through an inverse CDF
pub struct CdfGenerator {
    spec: NumberSpec,
    function: Arc<dyn CumulativeDistributionFunction>,
    min_prob: f64,
    prob_scale: f64,
    rng: Option<Xoshiro256PlusPlus>,
    state: GeneratorState,
}

impl CdfGenerator {
    pub fn new(spec: NumberSpec, function: Arc<dyn CumulativeDistributionFunction>) -> Self {
        Self {
            spec,
            function,
            min_prob: 0.0,
            prob_scale: 0.0,
            rng: None,
            state: GeneratorState::Created,
        }
    }

    /// Snap `x` down to the grid and keep it inside the range
    fn snap(&self, x: f64) -> Number {
        let min = self.spec.min().as_f64();
        let max = self.spec.max().as_f64();
        match self.spec.floor_index(x.clamp(min, max)) {
            Some(index) => self.spec.value_at(index),
            None => self.spec.min(),
        }
    }
}

impl Generator<Number> for CdfGenerator {
    fn init(&mut self, context: &GeneratorContext) -> Result<()> {
        self.state.assert_created("CdfGenerator")?;
        self.spec.validate()?;
        let min = self.spec.min().as_f64();
        let upper = self.spec.max().as_f64() + self.spec.granularity().as_f64();
        self.min_prob = self.function.cumulative_probability(min);
        self.prob_scale = self.function.cumulative_probability(upper) - self.min_prob;
        if !(self.prob_scale > 0.0) {
            return Err(GeneratorError::config(format!(
                "cumulative distribution has no probability mass in [{}, {}]",
                self.spec.min(),
                self.spec.max()
            )));
        }
        self.rng = Some(context.new_rng());
        self.state = GeneratorState::Running;
        Ok(())
    }

    fn generate(&mut self) -> Result<Option<Number>> {
        self.state.assert_running("CdfGenerator")?;
        let rng = match self.rng.as_mut() {
            Some(rng) => rng,
            None => return Ok(None),
        };
        let p = self.min_prob + rng.gen::<f64>() * self.prob_scale;
        let x = self.function.inverse(p);
        Ok(Some(self.snap(x)))
    }

    fn reset(&mut self) -> Result<()> {
        if self.state == GeneratorState::Created {
            return self.init(&GeneratorContext::default());
        }
        self.state.assert_not_closed("CdfGenerator")
    }

    fn close(&mut self) {
        self.state = GeneratorState::Closed;
    }

    fn state(&self) -> GeneratorState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{drain, ListGenerator};

    #[test]
    fn test_exponential_inverse() {
        let cdf = ExponentialCdf::new(0.5).unwrap();
        for p in [0.1, 0.5, 0.9] {
            let x = cdf.inverse(p);
            assert!((cdf.cumulative_probability(x) - p).abs() < 1e-12);
        }
        assert_eq!(cdf.cumulative_probability(-1.0), 0.0);
        assert!(ExponentialCdf::new(0.0).is_err());
    }

    #[test]
    fn test_pareto_inverse() {
        let cdf = ParetoCdf::new(2.0, 1.5).unwrap();
        assert_eq!(cdf.inverse(0.0), 2.0);
        let x = cdf.inverse(0.75);
        assert!((cdf.cumulative_probability(x) - 0.75).abs() < 1e-12);
        assert!(ParetoCdf::new(-1.0, 1.0).is_err());
    }

    #[test]
    fn test_samples_on_grid_and_skewed() {
        let dist = CdfDistribution::new(ExponentialCdf::new(0.1).unwrap());
        let mut gen = dist.create_number_generator(NumberSpec::long(0, 100, 5), false).unwrap();
        gen.init(&GeneratorContext::with_seed(17)).unwrap();

        let values: Vec<i64> = drain(&mut gen, Some(5000))
            .unwrap()
            .into_iter()
            .map(|n| n.as_i64())
            .collect();
        assert!(values.iter().all(|v| (0..=100).contains(v) && v % 5 == 0));
        let low = values.iter().filter(|&&v| v < 10).count();
        let high = values.iter().filter(|&&v| v >= 50).count();
        assert!(low > high * 5, "low {} high {}", low, high);
    }

    #[test]
    fn test_double_samples_respect_bounds() {
        let dist = CdfDistribution::new(ParetoCdf::new(1.0, 2.0).unwrap());
        let mut gen = dist
            .create_number_generator(NumberSpec::double(1.0, 3.0, 0.5), false)
            .unwrap();
        gen.init(&GeneratorContext::with_seed(4)).unwrap();
        for n in drain(&mut gen, Some(500)).unwrap() {
            assert!([1.0, 1.5, 2.0, 2.5, 3.0].contains(&n.as_f64()), "unexpected {}", n);
        }
    }

    #[test]
    fn test_unique_fails_at_construction() {
        let dist = Arc::new(CdfDistribution::new(ExponentialCdf::new(1.0).unwrap()));
        assert!(matches!(
            dist.create_number_generator(NumberSpec::long(0, 10, 1), true),
            Err(GeneratorError::Unsupported(_))
        ));
        let source = Box::new(ListGenerator::new(vec![Value::Long(1), Value::Long(2)]));
        assert!(matches!(
            dist.apply_to(source, true),
            Err(GeneratorError::Unsupported(_))
        ));
    }

    #[test]
    fn test_no_mass_in_range() {
        let dist = CdfDistribution::new(ParetoCdf::new(100.0, 1.0).unwrap());
        let mut gen = dist.create_number_generator(NumberSpec::long(0, 10, 1), false).unwrap();
        assert!(matches!(
            gen.init(&GeneratorContext::default()),
            Err(GeneratorError::Config(_))
        ));
    }
}
