//! Weight-based distributions
//!
//! A [`WeightFunction`] maps a numeric position to a non-negative weight. Applied to a
//! number spec, every grid point is weighted with the function and sampled in
//! proportion to its weight (see [`weighted`]). [`individual`] covers the other flavor,
//! where each materialized source item carries its own weight.
//!
//! # Built-in weight functions
//!
//! - [`ConstantFunction`]: equal weight everywhere, a uniform distribution
//! - [`LinearFunction`]: `offset + slope * x`
//! - [`GaussianFunction`]: bell curve around `average`
//! - [`ExponentialFunction`]: `scale * e^(rate * x)`
//!
//! Any closure can be used through [`FnWeight`].

pub mod individual;
pub mod weighted;

pub use individual::{FeatureWeight, IndividualWeight, IndividualWeightDistribution, IndividualWeightGenerator};
pub use weighted::{WeightedDoubleGenerator, WeightedLongGenerator, WeightedNumberGenerator};

use crate::distribution::{sample_by_index, Distribution};
use crate::error::{GeneratorError, Result};
use crate::generator::{double_to_number, long_to_number, BoxedGenerator};
use crate::value::{Number, NumberSpec, Value};
use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

/// Numeric weight per position
pub trait WeightFunction: Send + Sync + fmt::Debug {
    /// Weight of position `x`; must be finite and non-negative
    fn value(&self, x: f64) -> f64;
}

/// Same weight for every position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantFunction {
    pub value: f64,
}

impl ConstantFunction {
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

impl Default for ConstantFunction {
    fn default() -> Self {
        Self { value: 1.0 }
    }
}

impl WeightFunction for ConstantFunction {
    fn value(&self, _x: f64) -> f64 {
        self.value
    }
}

/// `offset + slope * x`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFunction {
    pub offset: f64,
    pub slope: f64,
}

impl LinearFunction {
    pub fn new(offset: f64, slope: f64) -> Self {
        Self { offset, slope }
    }
}

impl WeightFunction for LinearFunction {
    fn value(&self, x: f64) -> f64 {
        self.offset + self.slope * x
    }
}

/// Normal probability density around `average`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianFunction {
    pub average: f64,
    pub deviation: f64,
}

impl GaussianFunction {
    /// # Errors
    ///
    /// Fails with a `Config` error unless `deviation` is positive.
    pub fn new(average: f64, deviation: f64) -> Result<Self> {
        if !(deviation > 0.0) {
            return Err(GeneratorError::config(format!(
                "standard deviation must be positive, got {}",
                deviation
            )));
        }
        Ok(Self { average, deviation })
    }
}

impl WeightFunction for GaussianFunction {
    fn value(&self, x: f64) -> f64 {
        let z = (x - self.average) / self.deviation;
        (-0.5 * z * z).exp() / (self.deviation * (2.0 * PI).sqrt())
    }
}

/// `scale * e^(rate * x)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialFunction {
    pub scale: f64,
    pub rate: f64,
}

impl ExponentialFunction {
    pub fn new(scale: f64, rate: f64) -> Self {
        Self { scale, rate }
    }
}

impl WeightFunction for ExponentialFunction {
    fn value(&self, x: f64) -> f64 {
        self.scale * (self.rate * x).exp()
    }
}

/// Closure as weight function
pub struct FnWeight<F>(pub F);

impl<F> fmt::Debug for FnWeight<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnWeight")
    }
}

impl<F: Fn(f64) -> f64 + Send + Sync> WeightFunction for FnWeight<F> {
    fn value(&self, x: f64) -> f64 {
        (self.0)(x)
    }
}

/// Distribution that samples grid points in proportion to a weight function
///
/// Weighted sampling repeats values by nature, so `unique` is rejected.
#[derive(Debug, Clone)]
pub struct WeightFunctionDistribution {
    function: Arc<dyn WeightFunction>,
}

impl WeightFunctionDistribution {
    pub fn new(function: impl WeightFunction + 'static) -> Self {
        Self {
            function: Arc::new(function),
        }
    }

    pub fn from_arc(function: Arc<dyn WeightFunction>) -> Self {
        Self { function }
    }

    pub fn function(&self) -> &Arc<dyn WeightFunction> {
        &self.function
    }
}

impl Distribution for WeightFunctionDistribution {
    fn name(&self) -> &str {
        "weight"
    }

    fn create_number_generator(&self, spec: NumberSpec, unique: bool) -> Result<BoxedGenerator<Number>> {
        self.check_apply(unique)?;
        spec.validate()?;
        let function = Arc::clone(&self.function);
        let generator: BoxedGenerator<Number> = match spec {
            NumberSpec::Long { min, max, granularity } => Box::new(long_to_number(Box::new(
                WeightedLongGenerator::new(min, max, granularity, function),
            ))),
            NumberSpec::Double { min, max, granularity } => Box::new(double_to_number(Box::new(
                WeightedDoubleGenerator::new(min, max, granularity, function),
            ))),
        };
        Ok(generator)
    }

    fn check_apply(&self, unique: bool) -> Result<()> {
        if unique {
            return Err(GeneratorError::config(
                "weight functions cannot generate unique values",
            ));
        }
        Ok(())
    }

    fn apply_to(self: Arc<Self>, source: BoxedGenerator<Value>, unique: bool) -> Result<BoxedGenerator<Value>> {
        sample_by_index(self, source, unique)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{drain, GeneratorContext, ListGenerator};

    #[test]
    fn test_builtin_functions() {
        assert_eq!(ConstantFunction::default().value(42.0), 1.0);
        assert_eq!(LinearFunction::new(1.0, 2.0).value(3.0), 7.0);
        assert_eq!(ExponentialFunction::new(2.0, 0.0).value(5.0), 2.0);

        let gauss = GaussianFunction::new(10.0, 2.0).unwrap();
        assert!(gauss.value(10.0) > gauss.value(12.0));
        assert!((gauss.value(8.0) - gauss.value(12.0)).abs() < 1e-12);
        assert!(GaussianFunction::new(0.0, 0.0).is_err());

        assert_eq!(FnWeight(|x: f64| x * x).value(3.0), 9.0);
    }

    #[test]
    fn test_unique_rejected() {
        let dist = WeightFunctionDistribution::new(ConstantFunction::default());
        assert!(matches!(
            dist.create_number_generator(NumberSpec::long(0, 3, 1), true),
            Err(GeneratorError::Config(_))
        ));

        let source = Box::new(ListGenerator::new(vec![Value::Long(1), Value::Long(2)]));
        assert!(matches!(
            Arc::new(dist).apply_to(source, true),
            Err(GeneratorError::Config(_))
        ));
    }

    #[test]
    fn test_linear_weight_favors_high_values() {
        let dist = WeightFunctionDistribution::new(LinearFunction::new(0.0, 1.0));
        let mut gen = dist.create_number_generator(NumberSpec::long(0, 3, 1), false).unwrap();
        gen.init(&GeneratorContext::with_seed(8)).unwrap();

        let mut counts = [0u32; 4];
        for n in drain(&mut gen, Some(6000)).unwrap() {
            counts[n.as_i64() as usize] += 1;
        }
        // Weights 0, 1, 2, 3 out of 6
        assert_eq!(counts[0], 0);
        assert!(counts[1] > 800 && counts[1] < 1200, "counts {:?}", counts);
        assert!(counts[3] > 2700 && counts[3] < 3300, "counts {:?}", counts);
    }

    #[test]
    fn test_apply_to_weights_positions() {
        let dist = Arc::new(WeightFunctionDistribution::new(FnWeight(|x: f64| if x == 0.0 { 1.0 } else { 0.0 })));
        let source = Box::new(ListGenerator::new(vec![Value::from("first"), Value::from("second")]));
        let mut gen = dist.apply_to(source, false).unwrap();
        gen.init(&GeneratorContext::with_seed(1)).unwrap();
        for value in drain(&mut gen, Some(20)).unwrap() {
            assert_eq!(value, Value::from("first"));
        }
    }
}
