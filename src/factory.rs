//! Generator factory
//!
//! Turns configured fields into producers. Strategy names resolve through an injected
//! [`SequenceRegistry`]; a few forms are built on the fly instead of looked up:
//!
//! | Name | Strategy |
//! |------|----------|
//! | `random`, `wedge`, ... | registered instance |
//! | `step(2)`, `step(1, 3, 8)` | step with delta, initial value, limit |
//! | `shuffle(3)` | shuffle with the given increment |
//! | `head(5)` | first five values |
//! | `randomWalk(-2, 2)`, `randomWalk(1, 3, 10)` | walk with step bounds and initial value |
//! | `cumulated(7)` | mean of seven draws |
//! | `expand(50)`, `expand(50, 0.5)` | pool size and duplication quota |
//! | `weight:constant`, `weight:linear(o, s)`, `weight:gaussian(a, d)`, `weight:exponential(s, r)` | weight function |
//! | `cdf:exponential(l)`, `cdf:pareto(s, k)` | inverse-CDF sampling |
//! | `feature:<name>` | weight each record by one of its numeric fields |

use crate::config::{FieldConfig, FieldKind, GeneratorConfig};
use crate::distribution::cdf::{CdfDistribution, ExponentialCdf, ParetoCdf};
use crate::distribution::sequence::{
    CumulatedSequence, ExpandSequence, HeadSequence, RandomWalkSequence, ShuffleSequence, StepSequence,
};
use crate::distribution::weight::{
    ConstantFunction, ExponentialFunction, FeatureWeight, GaussianFunction, IndividualWeightDistribution,
    LinearFunction, WeightFunctionDistribution,
};
use crate::distribution::{Distribution, SequenceRegistry};
use crate::error::{GeneratorError, Result};
use crate::generator::{
    number_to_value, BoxedGenerator, Generator, GeneratorContext, GeneratorState, ListGenerator, MappedGenerator,
    UniqueValidatingGenerator,
};
use crate::temporal::{DateTimeGenerator, DateTimeSpec, DayGenerator};
use crate::value::{NumberSpec, Value};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Strategy used by fields that do not name one
pub const DEFAULT_DISTRIBUTION: &str = "random";

/// Builds field producers against one registry and one set of engine settings
#[derive(Debug)]
pub struct GeneratorFactory<'r> {
    registry: &'r SequenceRegistry,
    config: GeneratorConfig,
}

impl<'r> GeneratorFactory<'r> {
    pub fn new(registry: &'r SequenceRegistry, config: GeneratorConfig) -> Self {
        Self { registry, config }
    }

    /// Context to initialize the factory's producers with
    pub fn context(&self) -> GeneratorContext {
        GeneratorContext::new(self.config.clone())
    }

    /// Resolve a strategy name
    ///
    /// # Errors
    ///
    /// `Config` for unknown names, malformed argument lists and invalid parameters.
    pub fn distribution(&self, name: &str) -> Result<Arc<dyn Distribution>> {
        let name = name.trim();
        if let Some(function) = name.strip_prefix("weight:") {
            return weight_distribution(function);
        }
        if let Some(function) = name.strip_prefix("cdf:") {
            return cdf_distribution(function);
        }
        if let Some(feature) = name.strip_prefix("feature:") {
            let feature = feature.trim();
            if feature.is_empty() {
                return Err(GeneratorError::config("feature weight needs a field name"));
            }
            return Ok(Arc::new(IndividualWeightDistribution::new(FeatureWeight::new(feature))));
        }
        if name.contains('(') {
            return parameterized_sequence(name);
        }
        self.registry
            .get_registered_sequence(name, true)?
            .ok_or_else(|| GeneratorError::config(format!("unknown sequence '{}'", name)))
    }

    /// Build the producer of one configured field
    ///
    /// Numeric and temporal fields get their uniqueness from the strategy itself. Value
    /// lists are redistributed by `apply_to`, and a unique request additionally wraps
    /// the result in a [`UniqueValidatingGenerator`].
    pub fn create_field_generator(&self, field: &FieldConfig) -> Result<BoxedGenerator<Value>> {
        let name = field.distribution.as_deref().unwrap_or(DEFAULT_DISTRIBUTION);
        let distribution = self.distribution(name)?;
        debug!(field = %field.name, strategy = distribution.name(), unique = field.unique, "building field generator");

        let generator: BoxedGenerator<Value> = match &field.kind {
            FieldKind::Long { min, max, granularity } => {
                let numbers = distribution.create_number_generator(
                    NumberSpec::long(*min, *max, *granularity),
                    field.unique,
                )?;
                Box::new(number_to_value(numbers))
            }
            FieldKind::Double { min, max, granularity } => {
                let numbers = distribution.create_number_generator(
                    NumberSpec::double(*min, *max, *granularity),
                    field.unique,
                )?;
                Box::new(number_to_value(numbers))
            }
            FieldKind::Date { min, max, granularity } => {
                let days = DayGenerator::new(*min, *max, *granularity, distribution, field.unique);
                days.step_spec()?;
                let days: BoxedGenerator<NaiveDate> = Box::new(days);
                Box::new(MappedGenerator::new("DateToValue", days, Value::from))
            }
            FieldKind::DateTime {
                min_date,
                max_date,
                date_granularity,
                min_time,
                max_time,
                time_granularity,
                time_distribution,
            } => {
                let spec = DateTimeSpec {
                    min_date: *min_date,
                    max_date: *max_date,
                    date_granularity: *date_granularity,
                    min_time: *min_time,
                    max_time: *max_time,
                    time_granularity: *time_granularity,
                };
                let times = match time_distribution {
                    Some(time_name) => self.distribution(time_name)?,
                    None => Arc::clone(&distribution),
                };
                times.check_apply(field.unique)?;
                spec.time_spec(times.is_open_ended())?;
                date_granularity.last_step(*min_date, *max_date)?;
                let datetimes: BoxedGenerator<NaiveDateTime> =
                    Box::new(DateTimeGenerator::new(spec, distribution, times, field.unique));
                Box::new(MappedGenerator::new("DateTimeToValue", datetimes, Value::from))
            }
            FieldKind::Values { values } => {
                if values.is_empty() {
                    return Err(GeneratorError::config(format!("field '{}' has no values", field.name)));
                }
                let source: BoxedGenerator<Value> =
                    Box::new(ListGenerator::new(values.iter().cloned().map(Value::from).collect()));
                let redistributed = distribution.apply_to(source, field.unique)?;
                if field.unique {
                    Box::new(UniqueValidatingGenerator::new(redistributed))
                } else {
                    redistributed
                }
            }
        };
        Ok(generator)
    }

    /// Build a record producer over every configured field, in order
    pub fn create_record_generator(&self, fields: &[FieldConfig]) -> Result<RecordGenerator> {
        let mut record = RecordGenerator::new();
        for field in fields {
            record.add_field(field.name.clone(), self.create_field_generator(field)?);
        }
        Ok(record)
    }
}

fn weight_distribution(function: &str) -> Result<Arc<dyn Distribution>> {
    let (name, args) = parse_call(function)?;
    let distribution = match (name, args.as_slice()) {
        ("constant", []) => WeightFunctionDistribution::new(ConstantFunction::default()),
        ("constant", [value]) => WeightFunctionDistribution::new(ConstantFunction::new(*value)),
        ("linear", [offset, slope]) => WeightFunctionDistribution::new(LinearFunction::new(*offset, *slope)),
        ("gaussian", [average, deviation]) => {
            WeightFunctionDistribution::new(GaussianFunction::new(*average, *deviation)?)
        }
        ("exponential", [scale, rate]) => WeightFunctionDistribution::new(ExponentialFunction::new(*scale, *rate)),
        _ => {
            return Err(GeneratorError::config(format!(
                "unknown weight function '{}'",
                function
            )))
        }
    };
    Ok(Arc::new(distribution))
}

fn cdf_distribution(function: &str) -> Result<Arc<dyn Distribution>> {
    let (name, args) = parse_call(function)?;
    match (name, args.as_slice()) {
        ("exponential", [lambda]) => Ok(Arc::new(CdfDistribution::new(ExponentialCdf::new(*lambda)?))),
        ("pareto", [scale, shape]) => Ok(Arc::new(CdfDistribution::new(ParetoCdf::new(*scale, *shape)?))),
        _ => Err(GeneratorError::config(format!("unknown cdf '{}'", function))),
    }
}

fn parameterized_sequence(call: &str) -> Result<Arc<dyn Distribution>> {
    let (name, args) = parse_call(call)?;
    match (name, args.as_slice()) {
        ("step", [delta]) => Ok(Arc::new(StepSequence::new(integer(*delta)?))),
        ("step", [delta, initial]) => Ok(Arc::new(StepSequence::new(integer(*delta)?).with_initial(*initial))),
        ("step", [delta, initial, limit]) => Ok(Arc::new(
            StepSequence::new(integer(*delta)?)
                .with_initial(*initial)
                .with_limit(*limit),
        )),
        ("shuffle", [increment]) => Ok(Arc::new(ShuffleSequence::new(count(*increment)?)?)),
        ("head", [size]) | ("single", [size]) => Ok(Arc::new(HeadSequence::new(count(*size)?)?)),
        ("randomWalk", [min_step, max_step]) => {
            Ok(Arc::new(RandomWalkSequence::new(integer(*min_step)?, integer(*max_step)?)?))
        }
        ("randomWalk", [min_step, max_step, initial]) => Ok(Arc::new(
            RandomWalkSequence::new(integer(*min_step)?, integer(*max_step)?)?.with_initial(*initial),
        )),
        ("cumulated", [draws]) => {
            let draws = u32::try_from(count(*draws)?)
                .map_err(|_| GeneratorError::config(format!("too many draws: {}", draws)))?;
            Ok(Arc::new(CumulatedSequence::with_draws(draws)?))
        }
        ("expand", [pool_size]) => Ok(Arc::new(ExpandSequence::new().with_pool_size(pool(*pool_size)?))),
        ("expand", [pool_size, quota]) => Ok(Arc::new(
            ExpandSequence::new()
                .with_pool_size(pool(*pool_size)?)
                .with_duplication_quota(*quota),
        )),
        _ => Err(GeneratorError::config(format!("unknown sequence '{}'", call))),
    }
}

/// Split `name(a, b)` into its name and numeric arguments; a bare name has none
fn parse_call(call: &str) -> Result<(&str, Vec<f64>)> {
    let call = call.trim();
    let open = match call.find('(') {
        Some(open) => open,
        None => return Ok((call, Vec::new())),
    };
    let inner = call[open + 1..]
        .strip_suffix(')')
        .ok_or_else(|| GeneratorError::config(format!("missing ')' in '{}'", call)))?;
    let args = if inner.trim().is_empty() {
        Vec::new()
    } else {
        inner
            .split(',')
            .map(|arg| {
                arg.trim()
                    .parse::<f64>()
                    .map_err(|_| GeneratorError::config(format!("invalid argument '{}' in '{}'", arg.trim(), call)))
            })
            .collect::<Result<Vec<_>>>()?
    };
    Ok((call[..open].trim(), args))
}

fn integer(value: f64) -> Result<i64> {
    if value.fract() != 0.0 || !value.is_finite() || value.abs() > i64::MAX as f64 {
        return Err(GeneratorError::config(format!("expected an integer, got {}", value)));
    }
    Ok(value as i64)
}

fn count(value: f64) -> Result<u64> {
    let value = integer(value)?;
    u64::try_from(value).map_err(|_| GeneratorError::config(format!("expected a non-negative count, got {}", value)))
}

fn pool(value: f64) -> Result<usize> {
    let value = count(value)?;
    if value == 0 {
        return Err(GeneratorError::config("expand pool size must be positive"));
    }
    usize::try_from(value).map_err(|_| GeneratorError::config(format!("pool size {} is too large", value)))
}

/// Produces one [`Value::Record`] per call, one entry per named field
///
/// Depletes as soon as any field does.
pub struct RecordGenerator {
    fields: Vec<(String, BoxedGenerator<Value>)>,
    state: GeneratorState,
}

impl RecordGenerator {
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            state: GeneratorState::Created,
        }
    }

    pub fn add_field(&mut self, name: impl Into<String>, generator: BoxedGenerator<Value>) {
        self.fields.push((name.into(), generator));
    }

    /// Field names in generation order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }
}

impl Default for RecordGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator<Value> for RecordGenerator {
    fn init(&mut self, context: &GeneratorContext) -> Result<()> {
        self.state.assert_created("RecordGenerator")?;
        for (_, generator) in self.fields.iter_mut() {
            generator.init(context)?;
        }
        self.state = GeneratorState::Running;
        Ok(())
    }

    fn generate(&mut self) -> Result<Option<Value>> {
        self.state.assert_running("RecordGenerator")?;
        let mut record = BTreeMap::new();
        for (name, generator) in self.fields.iter_mut() {
            match generator.generate()? {
                Some(value) => {
                    record.insert(name.clone(), value);
                }
                None => return Ok(None),
            }
        }
        Ok(Some(Value::Record(record)))
    }

    fn reset(&mut self) -> Result<()> {
        if self.state == GeneratorState::Created {
            return self.init(&GeneratorContext::default());
        }
        self.state.assert_not_closed("RecordGenerator")?;
        for (_, generator) in self.fields.iter_mut() {
            generator.reset()?;
        }
        Ok(())
    }

    fn close(&mut self) {
        for (_, generator) in self.fields.iter_mut() {
            generator.close();
        }
        self.state = GeneratorState::Closed;
    }

    fn state(&self) -> GeneratorState {
        self.state
    }

    fn is_thread_safe(&self) -> bool {
        self.fields.iter().all(|(_, g)| g.is_thread_safe())
    }

    fn is_parallelizable(&self) -> bool {
        self.fields.iter().all(|(_, g)| g.is_parallelizable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigValue;
    use crate::generator::drain;
    use crate::temporal::DateGranularity;

    fn factory(registry: &SequenceRegistry) -> GeneratorFactory<'_> {
        GeneratorFactory::new(
            registry,
            GeneratorConfig {
                seed: Some(11),
                ..GeneratorConfig::default()
            },
        )
    }

    fn long_field(name: &str, min: i64, max: i64, distribution: &str, unique: bool) -> FieldConfig {
        FieldConfig {
            name: name.to_string(),
            kind: FieldKind::Long { min, max, granularity: 1 },
            distribution: Some(distribution.to_string()),
            unique,
        }
    }

    fn values_field(name: &str, values: &[&str], distribution: &str, unique: bool) -> FieldConfig {
        FieldConfig {
            name: name.to_string(),
            kind: FieldKind::Values {
                values: values.iter().map(|v| ConfigValue::Text(v.to_string())).collect(),
            },
            distribution: Some(distribution.to_string()),
            unique,
        }
    }

    fn longs(generator: &mut BoxedGenerator<Value>, limit: usize) -> Vec<i64> {
        drain(generator, Some(limit))
            .unwrap()
            .into_iter()
            .map(|v| match v {
                Value::Long(n) => n,
                other => panic!("unexpected value {:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_registered_names() {
        let registry = SequenceRegistry::with_defaults();
        let factory = factory(&registry);
        assert_eq!(factory.distribution("random").unwrap().name(), "random");
        assert_eq!(factory.distribution(" wedge ").unwrap().name(), "wedge");
        assert_eq!(factory.distribution("single").unwrap().name(), "head");
        assert!(matches!(factory.distribution("nope"), Err(GeneratorError::Config(_))));
    }

    #[test]
    fn test_parameterized_names() {
        let registry = SequenceRegistry::with_defaults();
        let factory = factory(&registry);
        assert_eq!(factory.distribution("step(2)").unwrap().name(), "step");
        assert_eq!(factory.distribution("randomWalk(-2, 2)").unwrap().name(), "randomWalk");
        assert_eq!(factory.distribution("cumulated(7)").unwrap().name(), "cumulated");
        assert_eq!(factory.distribution("weight:gaussian(5, 2)").unwrap().name(), "weight");
        assert_eq!(factory.distribution("cdf:pareto(1, 2)").unwrap().name(), "cdf");
        assert_eq!(factory.distribution("feature:population").unwrap().name(), "individualWeight");

        for bad in [
            "step(x)",
            "step(1.5)",
            "step(1, 2, 3, 4)",
            "shuffle(0)",
            "shuffle(-1)",
            "head(3",
            "expand(0)",
            "weight:bogus",
            "weight:gaussian(0, 0)",
            "cdf:exponential(-1)",
            "feature:",
            "unknown(1)",
        ] {
            assert!(
                matches!(factory.distribution(bad), Err(GeneratorError::Config(_))),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_long_fields() {
        let registry = SequenceRegistry::with_defaults();
        let factory = factory(&registry);
        let context = factory.context();

        let mut gen = factory
            .create_field_generator(&long_field("n", 0, 10, "step(2)", false))
            .unwrap();
        gen.init(&context).unwrap();
        assert_eq!(longs(&mut gen, 100), vec![0, 2, 4, 6, 8, 10]);

        let mut gen = factory
            .create_field_generator(&long_field("n", 0, 5, "shuffle(3)", true))
            .unwrap();
        gen.init(&context).unwrap();
        assert_eq!(longs(&mut gen, 100), vec![0, 3, 1, 4, 2, 5]);

        let mut gen = factory
            .create_field_generator(&long_field("n", 0, 3, "weight:constant", false))
            .unwrap();
        gen.init(&context).unwrap();
        assert!(longs(&mut gen, 500).iter().all(|n| (0..=3).contains(n)));
    }

    #[test]
    fn test_unsupported_unique_requests_fail_at_build_time() {
        let registry = SequenceRegistry::with_defaults();
        let factory = factory(&registry);
        assert!(matches!(
            factory.create_field_generator(&long_field("n", 0, 10, "cdf:exponential(0.5)", true)),
            Err(GeneratorError::Unsupported(_))
        ));
        assert!(matches!(
            factory.create_field_generator(&long_field("n", 0, 10, "weight:constant", true)),
            Err(GeneratorError::Config(_))
        ));
        assert!(matches!(
            factory.create_field_generator(&long_field("n", 0, 10, "feature:x", false)),
            Err(GeneratorError::Unsupported(_))
        ));
    }

    #[test]
    fn test_unique_values_field() {
        let registry = SequenceRegistry::with_defaults();
        let factory = factory(&registry);
        let field = values_field("color", &["a", "b", "c", "d", "e"], "random", true);
        let mut gen = factory.create_field_generator(&field).unwrap();
        gen.init(&factory.context()).unwrap();

        let mut first = drain(&mut gen, None).unwrap();
        assert_eq!(first.len(), 5);
        assert_eq!(gen.generate().unwrap(), None);
        first.sort_by_key(|v| format!("{:?}", v));
        first.dedup();
        assert_eq!(first.len(), 5);

        gen.reset().unwrap();
        assert_eq!(drain(&mut gen, None).unwrap().len(), 5);
    }

    #[test]
    fn test_empty_values_rejected() {
        let registry = SequenceRegistry::with_defaults();
        let factory = factory(&registry);
        assert!(matches!(
            factory.create_field_generator(&values_field("empty", &[], "random", false)),
            Err(GeneratorError::Config(_))
        ));
    }

    #[test]
    fn test_date_field() {
        let registry = SequenceRegistry::with_defaults();
        let factory = factory(&registry);
        let field = FieldConfig {
            name: "day".to_string(),
            kind: FieldKind::Date {
                min: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                max: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                granularity: DateGranularity::days(7),
            },
            distribution: Some("step".to_string()),
            unique: false,
        };
        let mut gen = factory.create_field_generator(&field).unwrap();
        gen.init(&factory.context()).unwrap();
        assert_eq!(
            drain(&mut gen, None).unwrap(),
            vec![
                Value::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
                Value::Date(NaiveDate::from_ymd_opt(2024, 1, 8).unwrap()),
                Value::Date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()),
            ]
        );

        let reversed = FieldConfig {
            kind: FieldKind::Date {
                min: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                max: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                granularity: DateGranularity::days(1),
            },
            ..field
        };
        assert!(matches!(
            factory.create_field_generator(&reversed),
            Err(GeneratorError::Config(_))
        ));
    }

    #[test]
    fn test_record_generator_depletes_with_shortest_field() {
        let registry = SequenceRegistry::with_defaults();
        let factory = factory(&registry);
        let fields = vec![
            long_field("id", 1, 3, "increment", true),
            values_field("color", &["red", "green"], "random", false),
        ];
        let mut gen = factory.create_record_generator(&fields).unwrap();
        assert_eq!(gen.field_names().collect::<Vec<_>>(), vec!["id", "color"]);
        gen.init(&factory.context()).unwrap();

        let records = drain(&mut gen, None).unwrap();
        assert_eq!(records.len(), 3);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.field("id"), Some(&Value::Long(i as i64 + 1)));
            let color = record.field("color").unwrap();
            assert!(*color == Value::from("red") || *color == Value::from("green"));
        }
        assert_eq!(gen.generate().unwrap(), None);

        gen.reset().unwrap();
        assert_eq!(drain(&mut gen, None).unwrap().len(), 3);
        gen.close();
        assert_eq!(gen.state(), GeneratorState::Closed);
    }
}
