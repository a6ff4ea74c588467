//! Configuration validation

use super::*;
use crate::distribution::SequenceRegistry;
use crate::factory::GeneratorFactory;
use crate::value::Value;
use anyhow::{Context, Result};
use std::collections::HashSet;
use tracing::warn;

/// Validate complete configuration
///
/// Every field is resolved through a [`GeneratorFactory`] over `registry`, so unknown
/// strategy names and unsupported unique requests are reported here rather than when
/// the first row is generated.
pub fn validate_config(config: &Config, registry: &SequenceRegistry) -> Result<()> {
    validate_generator(&config.generator)?;
    validate_fields(&config.fields)?;

    let factory = GeneratorFactory::new(registry, config.generator.clone());
    for field in &config.fields {
        factory
            .create_field_generator(field)
            .with_context(|| format!("Invalid field '{}'", field.name))?;
    }

    Ok(())
}

/// Validate engine settings
pub fn validate_generator(generator: &GeneratorConfig) -> Result<()> {
    if generator.cache_size == 0 {
        anyhow::bail!("cache_size must be at least 1");
    }

    if generator.expand_pool_size == 0 {
        anyhow::bail!("expand_pool_size must be at least 1");
    }

    if generator.unique_error_threshold == 0 {
        anyhow::bail!("unique_error_threshold must be at least 1");
    }

    if generator.unique_warn_threshold > generator.unique_error_threshold {
        anyhow::bail!(
            "unique_warn_threshold ({}) must not exceed unique_error_threshold ({})",
            generator.unique_warn_threshold,
            generator.unique_error_threshold
        );
    }

    Ok(())
}

/// Validate field names and bounds
pub fn validate_fields(fields: &[FieldConfig]) -> Result<()> {
    if fields.is_empty() {
        anyhow::bail!("at least one field must be configured");
    }

    let mut names = HashSet::new();
    for (i, field) in fields.iter().enumerate() {
        if field.name.trim().is_empty() {
            anyhow::bail!("field {} has an empty name", i);
        }
        if !names.insert(field.name.as_str()) {
            anyhow::bail!("duplicate field name '{}'", field.name);
        }
        validate_field(field).with_context(|| format!("Invalid field '{}'", field.name))?;
    }

    Ok(())
}

fn validate_field(field: &FieldConfig) -> Result<()> {
    match &field.kind {
        FieldKind::Long { min, max, granularity } => {
            if min > max {
                anyhow::bail!("min ({}) must not exceed max ({})", min, max);
            }
            if *granularity <= 0 {
                anyhow::bail!("granularity must be positive, got {}", granularity);
            }
        }
        FieldKind::Double { min, max, granularity } => {
            if !min.is_finite() || !max.is_finite() {
                anyhow::bail!("min and max must be finite, got {} and {}", min, max);
            }
            if min > max {
                anyhow::bail!("min ({}) must not exceed max ({})", min, max);
            }
            if !(*granularity > 0.0) || !granularity.is_finite() {
                anyhow::bail!("granularity must be positive, got {}", granularity);
            }
        }
        FieldKind::Date { min, max, granularity } => {
            if min > max {
                anyhow::bail!("min ({}) must not be after max ({})", min, max);
            }
            if granularity.is_zero() {
                anyhow::bail!("date granularity must not be zero");
            }
        }
        FieldKind::DateTime {
            min_date,
            max_date,
            date_granularity,
            min_time,
            max_time,
            time_granularity,
            ..
        } => {
            if min_date > max_date {
                anyhow::bail!("min_date ({}) must not be after max_date ({})", min_date, max_date);
            }
            if date_granularity.is_zero() {
                anyhow::bail!("date_granularity must not be zero");
            }
            if min_time > max_time {
                anyhow::bail!("min_time ({}) must not be after max_time ({})", min_time, max_time);
            }
            if *time_granularity <= 0 {
                anyhow::bail!("time_granularity must be positive, got {}", time_granularity);
            }
        }
        FieldKind::Values { values } => {
            if values.is_empty() {
                anyhow::bail!("values must not be empty");
            }
            if field.unique {
                let distinct: HashSet<Value> = values.iter().cloned().map(Value::from).collect();
                if distinct.len() < values.len() {
                    warn!(
                        field = %field.name,
                        listed = values.len(),
                        distinct = distinct.len(),
                        "unique field lists repeated values, fewer rows can be generated"
                    );
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::toml::parse_toml_string;

    fn field(name: &str, kind: FieldKind) -> FieldConfig {
        FieldConfig {
            name: name.to_string(),
            kind,
            distribution: None,
            unique: false,
        }
    }

    #[test]
    fn test_validate_generator() {
        let mut generator = GeneratorConfig::default();
        assert!(validate_generator(&generator).is_ok());

        generator.cache_size = 0;
        assert!(validate_generator(&generator).is_err());

        generator = GeneratorConfig::default();
        generator.unique_warn_threshold = 20;
        generator.unique_error_threshold = 10;
        assert!(validate_generator(&generator).is_err());

        generator = GeneratorConfig::default();
        generator.expand_pool_size = 0;
        assert!(validate_generator(&generator).is_err());
    }

    #[test]
    fn test_validate_field_names() {
        let kind = FieldKind::Long { min: 0, max: 9, granularity: 1 };
        assert!(validate_fields(&[]).is_err());
        assert!(validate_fields(&[field("a", kind.clone()), field("b", kind.clone())]).is_ok());
        assert!(validate_fields(&[field("a", kind.clone()), field("a", kind.clone())]).is_err());
        assert!(validate_fields(&[field(" ", kind)]).is_err());
    }

    #[test]
    fn test_validate_bounds() {
        assert!(validate_fields(&[field("n", FieldKind::Long { min: 5, max: 1, granularity: 1 })]).is_err());
        assert!(validate_fields(&[field("n", FieldKind::Long { min: 1, max: 5, granularity: 0 })]).is_err());
        assert!(validate_fields(&[field(
            "x",
            FieldKind::Double { min: 0.0, max: f64::INFINITY, granularity: 1.0 }
        )])
        .is_err());
        assert!(validate_fields(&[field("v", FieldKind::Values { values: vec![] })]).is_err());
    }

    #[test]
    fn test_validate_config_resolves_distributions() {
        let registry = SequenceRegistry::with_defaults();
        let config = parse_toml_string(
            r#"
[[fields]]
name = "id"
type = "long"
min = 1
max = 10
distribution = "shuffle(3)"
unique = true

[[fields]]
name = "day"
type = "date"
min = "2024-01-01"
max = "2024-12-31"
granularity = "0,1,0"
"#,
        )
        .unwrap();
        assert!(validate_config(&config, &registry).is_ok());

        let mut unknown = config.clone();
        unknown.fields[0].distribution = Some("zigzag".to_string());
        let err = validate_config(&unknown, &registry).unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid field 'id'"));

        let mut unsupported = config;
        unsupported.fields[0].distribution = Some("cdf:exponential(1)".to_string());
        assert!(validate_config(&unsupported, &registry).is_err());
    }
}
