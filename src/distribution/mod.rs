//! Distribution strategies
//!
//! A distribution decides *in what order* and *how often* values reach the consumer.
//! It offers two operations:
//!
//! - [`create_number_generator`](Distribution::create_number_generator): a numeric
//!   generator over the grid of a [`NumberSpec`]
//! - [`apply_to`](Distribution::apply_to): a derived generator that reorders,
//!   resamples or reweights the values of an existing source
//!
//! # Strategy families
//!
//! - **Sequences** ([`sequence`]): random, shuffle, cumulated, randomWalk, step,
//!   increment, wedge, bitreverse, expand, fibonacci, padovan, head
//! - **Weight functions** ([`weight`]): numeric weight per grid point, sampled through a
//!   cumulative table and binary search
//! - **Individual weights** ([`weight::individual`]): weight per materialized item
//! - **Cumulative distribution functions** ([`cdf`]): continuous inverse-CDF sampling
//!
//! # Statelessness
//!
//! A distribution holds configuration only. PRNGs and cursors live in the generators it
//! creates, so one instance (for example the canonical one from the
//! [`SequenceRegistry`]) can be applied to any number of sources at the same time.
//!
//! # Example
//!
//! ```
//! use datapulse::distribution::{Distribution, sequence::StepSequence};
//! use datapulse::generator::GeneratorContext;
//! use datapulse::value::{Number, NumberSpec};
//!
//! let step = StepSequence::default();
//! let mut gen = step.create_number_generator(NumberSpec::long(1, 7, 3), false)?;
//! gen.init(&GeneratorContext::default())?;
//! assert_eq!(gen.generate()?, Some(Number::Long(1)));
//! assert_eq!(gen.generate()?, Some(Number::Long(4)));
//! assert_eq!(gen.generate()?, Some(Number::Long(7)));
//! assert_eq!(gen.generate()?, None);
//! # Ok::<(), datapulse::GeneratorError>(())
//! ```

pub mod cdf;
pub mod registry;
pub mod sequence;
pub mod weight;

pub use registry::SequenceRegistry;

use crate::error::Result;
use crate::generator::{BoxedGenerator, IndexBasedSampleGeneratorProxy};
use crate::value::{Number, NumberSpec, Value};
use std::fmt;
use std::sync::Arc;

/// Distribution trait for all sampling strategies
///
/// # Thread Safety
///
/// Distributions are `Send + Sync` and hold no mutable state, so a single instance can
/// be registered once and shared by every generator graph in the process.
///
/// # Errors
///
/// Both operations validate eagerly: bad bounds are `Config` errors, capabilities a
/// strategy lacks are `Unsupported` or `Config` errors, and all of them are raised here
/// rather than on the first `generate()`.
pub trait Distribution: Send + Sync + fmt::Debug {
    /// Name the strategy is registered under
    fn name(&self) -> &str;

    /// Create a numeric generator over the grid of `spec`
    ///
    /// With `unique` the generator must never repeat a value.
    fn create_number_generator(&self, spec: NumberSpec, unique: bool) -> Result<BoxedGenerator<Number>>;

    /// Reject requests the strategy can never serve, whatever the grid
    ///
    /// Bound and position checks depend on the grid and belong to
    /// `create_number_generator`.
    fn check_apply(&self, _unique: bool) -> Result<()> {
        Ok(())
    }

    /// Whether the strategy walks forward from `min` without needing `max` as a bound
    fn is_open_ended(&self) -> bool {
        false
    }

    /// Derive a generator that redistributes the values of `source`
    ///
    /// Sequences materialize the source and sample positions of the resulting list
    /// (see [`sample_by_index`]); strategies with a streaming behavior override this.
    fn apply_to(self: Arc<Self>, source: BoxedGenerator<Value>, unique: bool) -> Result<BoxedGenerator<Value>>;
}

/// Default `apply_to`: materialize the source and let `distribution` pick list positions
pub fn sample_by_index(
    distribution: Arc<dyn Distribution>,
    source: BoxedGenerator<Value>,
    unique: bool,
) -> Result<BoxedGenerator<Value>> {
    // Positions are checked at init, once the list length is known
    distribution.check_apply(unique)?;
    Ok(Box::new(IndexBasedSampleGeneratorProxy::new(source, distribution, unique)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{drain, GeneratorContext, ListGenerator};
    use sequence::{CumulatedSequence, RandomWalkSequence, StepSequence, WedgeSequence};

    fn letters() -> BoxedGenerator<Value> {
        Box::new(ListGenerator::new(
            ["a", "b", "c", "d"].iter().map(|s| Value::from(*s)).collect(),
        ))
    }

    #[test]
    fn test_sample_by_index_uses_distribution_order() {
        let wedge: Arc<dyn Distribution> = Arc::new(WedgeSequence);
        let mut gen = sample_by_index(wedge, letters(), false).unwrap();
        gen.init(&GeneratorContext::default()).unwrap();
        let values = drain(&mut gen, None).unwrap();
        assert_eq!(
            values,
            vec![Value::from("a"), Value::from("d"), Value::from("b"), Value::from("c")]
        );
    }

    #[test]
    fn test_positional_parameters_checked_against_list_length() {
        let numbers: Vec<Value> = (0..10).map(Value::Long).collect();
        let step: Arc<dyn Distribution> = Arc::new(StepSequence::new(1).with_initial(5.0));
        let mut gen = Arc::clone(&step)
            .apply_to(Box::new(ListGenerator::new(numbers.clone())), false)
            .unwrap();
        gen.init(&GeneratorContext::default()).unwrap();
        assert_eq!(drain(&mut gen, None).unwrap(), numbers[5..].to_vec());

        let walk: Arc<dyn Distribution> = Arc::new(RandomWalkSequence::new(-1, 1).unwrap().with_initial(3.0));
        let mut gen = walk.apply_to(Box::new(ListGenerator::new(numbers.clone())), false).unwrap();
        gen.init(&GeneratorContext::with_seed(3)).unwrap();
        for value in drain(&mut gen, Some(50)).unwrap() {
            assert!(numbers.contains(&value));
        }

        // Too short for the initial position: reported once the length is known
        let mut gen = step.apply_to(letters(), false).unwrap();
        assert!(matches!(
            gen.init(&GeneratorContext::default()),
            Err(crate::GeneratorError::Config(_))
        ));
    }

    #[test]
    fn test_sample_by_index_fails_fast_on_unique() {
        let cumulated: Arc<dyn Distribution> = Arc::new(CumulatedSequence::default());
        let result = sample_by_index(cumulated, letters(), true);
        assert!(matches!(result, Err(crate::GeneratorError::Config(_))));
    }
}
