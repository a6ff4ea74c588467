//! Per-item weights
//!
//! An [`IndividualWeight`] assigns a weight to each materialized source item, for
//! example a `population` field on city records. The source is pulled into memory once
//! and items are drawn in proportion to their weights.
//!
//! Only `apply_to` makes sense for this family: there is no item to weigh when asked
//! for a plain number generator.

use crate::distribution::weight::weighted::{cumulative_table, lower_bound};
use crate::distribution::Distribution;
use crate::error::{GeneratorError, Result};
use crate::generator::{drain, BoxedGenerator, Generator, GeneratorContext, GeneratorState, GeneratorWrapper};
use crate::value::{Number, NumberSpec, Value};
use rand::Rng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Weight of a single item
pub trait IndividualWeight<E>: Send + Sync + fmt::Debug {
    fn weight(&self, item: &E) -> f64;
}

/// Weight read from a numeric field of a record
///
/// Items that are not records or lack the field weigh zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureWeight {
    feature: String,
}

impl FeatureWeight {
    pub fn new(feature: impl Into<String>) -> Self {
        Self {
            feature: feature.into(),
        }
    }

    pub fn feature(&self) -> &str {
        &self.feature
    }
}

impl IndividualWeight<Value> for FeatureWeight {
    fn weight(&self, item: &Value) -> f64 {
        item.field(&self.feature).and_then(Value::as_f64).unwrap_or(0.0)
    }
}

/// Distribution that draws source items in proportion to their individual weights
#[derive(Debug)]
pub struct IndividualWeightDistribution<W> {
    weight: Arc<W>,
}

impl<W> IndividualWeightDistribution<W> {
    pub fn new(weight: W) -> Self {
        Self {
            weight: Arc::new(weight),
        }
    }
}

impl<W: IndividualWeight<Value> + 'static> Distribution for IndividualWeightDistribution<W> {
    fn name(&self) -> &str {
        "individualWeight"
    }

    fn create_number_generator(&self, _spec: NumberSpec, _unique: bool) -> Result<BoxedGenerator<Number>> {
        Err(GeneratorError::unsupported(
            "number generation is not supported by weight-based strategies",
        ))
    }

    fn apply_to(self: Arc<Self>, source: BoxedGenerator<Value>, unique: bool) -> Result<BoxedGenerator<Value>> {
        if unique {
            return Err(GeneratorError::config(
                "weight-based strategies cannot generate unique values",
            ));
        }
        let weight: Arc<dyn IndividualWeight<Value>> = self.weight.clone();
        Ok(Box::new(IndividualWeightGenerator::new(source, weight)))
    }
}

/// Materialized source plus its cumulative weight table
struct WeightedItems<E> {
    items: Vec<E>,
    table: Vec<f64>,
}

/// Samples a materialized source by per-item weights
pub struct IndividualWeightGenerator<E> {
    wrapper: GeneratorWrapper<E>,
    weight: Arc<dyn IndividualWeight<E>>,
    context: Option<GeneratorContext>,
    sample: Option<WeightedItems<E>>,
    rng: Option<Xoshiro256PlusPlus>,
    truncated: bool,
}

impl<E: Clone + Send + 'static> IndividualWeightGenerator<E> {
    pub fn new(source: BoxedGenerator<E>, weight: Arc<dyn IndividualWeight<E>>) -> Self {
        Self {
            wrapper: GeneratorWrapper::new("IndividualWeightGenerator", source),
            weight,
            context: None,
            sample: None,
            rng: None,
            truncated: false,
        }
    }

    /// Whether the last materialization stopped at the cache size
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    fn materialize(&mut self, context: &GeneratorContext) -> Result<()> {
        let limit = context.cache_size();
        let items = drain(self.wrapper.source_mut(), Some(limit))?;
        let truncated = items.len() == limit && self.wrapper.source_mut().generate()?.is_some();
        if truncated {
            warn!(limit, "source exceeds the cache size, weighting the first values only");
        }

        let sample = if items.is_empty() {
            None
        } else {
            let weights: Vec<f64> = items.iter().map(|item| self.weight.weight(item)).collect();
            let table = cumulative_table(&weights)?.ok_or_else(|| {
                GeneratorError::illegal_state(format!(
                    "total weight of {} items is zero",
                    items.len()
                ))
            })?;
            Some(WeightedItems { items, table })
        };

        debug!(
            count = sample.as_ref().map_or(0, |s| s.items.len()),
            "materialized weighted source"
        );
        self.sample = sample;
        self.truncated = truncated;
        self.rng = Some(context.new_rng());
        Ok(())
    }
}

impl<E: Clone + Send + 'static> Generator<E> for IndividualWeightGenerator<E> {
    fn init(&mut self, context: &GeneratorContext) -> Result<()> {
        self.wrapper.init_source(context)?;
        self.context = Some(context.clone());
        self.materialize(context)
    }

    fn generate(&mut self) -> Result<Option<E>> {
        self.wrapper.state().assert_running(self.wrapper.owner())?;
        let (sample, rng) = match (self.sample.as_ref(), self.rng.as_mut()) {
            (Some(sample), Some(rng)) => (sample, rng),
            _ => return Ok(None),
        };
        let index = lower_bound(&sample.table, rng.gen::<f64>());
        Ok(Some(sample.items[index].clone()))
    }

    fn reset(&mut self) -> Result<()> {
        if self.wrapper.state() == GeneratorState::Created {
            return self.init(&GeneratorContext::default());
        }
        self.wrapper.reset_source()?;
        let context = self.context.clone().unwrap_or_default();
        self.materialize(&context)
    }

    fn close(&mut self) {
        self.sample = None;
        self.wrapper.close_source();
    }

    fn state(&self) -> GeneratorState {
        self.wrapper.state()
    }

    fn is_parallelizable(&self) -> bool {
        self.wrapper.source_parallelizable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::generator::ListGenerator;
    use std::collections::BTreeMap;

    fn city(name: &str, population: i64) -> Value {
        let mut fields = BTreeMap::new();
        fields.insert("name".to_string(), Value::from(name));
        fields.insert("population".to_string(), Value::Long(population));
        Value::Record(fields)
    }

    fn cities() -> BoxedGenerator<Value> {
        Box::new(ListGenerator::new(vec![
            city("small", 1),
            city("empty", 0),
            city("large", 3),
        ]))
    }

    fn distribution() -> Arc<IndividualWeightDistribution<FeatureWeight>> {
        Arc::new(IndividualWeightDistribution::new(FeatureWeight::new("population")))
    }

    #[test]
    fn test_sampling_follows_feature_weight() {
        let mut gen = distribution().apply_to(cities(), false).unwrap();
        gen.init(&GeneratorContext::with_seed(12)).unwrap();

        let values = drain(&mut gen, Some(4000)).unwrap();
        let large = values.iter().filter(|v| v.field("name") == Some(&Value::from("large"))).count();
        let empty = values.iter().filter(|v| v.field("name") == Some(&Value::from("empty"))).count();
        assert_eq!(empty, 0);
        // Expect 75% large, allow 5 points deviation
        assert!(large > 2800 && large < 3200, "large count {}", large);
    }

    #[test]
    fn test_truncation_is_observable() {
        let weight: Arc<dyn IndividualWeight<Value>> = Arc::new(FeatureWeight::new("population"));
        let context = GeneratorContext::new(GeneratorConfig {
            cache_size: 2,
            seed: Some(4),
            ..GeneratorConfig::default()
        });

        let mut gen = IndividualWeightGenerator::new(cities(), Arc::clone(&weight));
        gen.init(&context).unwrap();
        assert!(gen.is_truncated());
        // Only "small" carries weight among the first two cities
        for value in drain(&mut gen, Some(200)).unwrap() {
            assert_eq!(value.field("name"), Some(&Value::from("small")));
        }

        let mut gen = IndividualWeightGenerator::new(cities(), weight);
        gen.init(&GeneratorContext::with_seed(4)).unwrap();
        assert!(!gen.is_truncated());
    }

    #[test]
    fn test_number_generation_unsupported() {
        let result = distribution().create_number_generator(NumberSpec::long(0, 9, 1), false);
        match result {
            Err(GeneratorError::Unsupported(msg)) => {
                assert!(msg.contains("not supported by weight-based strategies"))
            }
            _ => panic!("expected an Unsupported error"),
        }
    }

    #[test]
    fn test_unique_rejected() {
        assert!(matches!(
            distribution().apply_to(cities(), true),
            Err(GeneratorError::Config(_))
        ));
    }

    #[test]
    fn test_zero_total_weight() {
        let source = Box::new(ListGenerator::new(vec![city("a", 0), Value::from("not a record")]));
        let mut gen = distribution().apply_to(source, false).unwrap();
        assert!(matches!(
            gen.init(&GeneratorContext::default()),
            Err(GeneratorError::IllegalState(_))
        ));
    }

    #[test]
    fn test_empty_source_is_depleted() {
        let source = Box::new(ListGenerator::new(Vec::<Value>::new()));
        let mut gen = distribution().apply_to(source, false).unwrap();
        gen.init(&GeneratorContext::default()).unwrap();
        assert_eq!(gen.generate().unwrap(), None);
    }
}
