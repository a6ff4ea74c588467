//! Configuration module
//!
//! Handles CLI argument parsing, TOML configuration files, and validation.
//!
//! # Example
//!
//! ```toml
//! [generator]
//! seed = 42
//! cache_size = 10000
//!
//! [[fields]]
//! name = "id"
//! type = "long"
//! min = 1
//! max = 1000
//! distribution = "increment"
//! unique = true
//!
//! [[fields]]
//! name = "joined"
//! type = "date"
//! min = "2010-07-06"
//! max = "2010-08-08"
//! granularity = "0,0,7"
//! distribution = "random"
//! ```

pub mod cli;
pub mod toml;
pub mod validator;

use crate::temporal::DateGranularity;
use crate::value::Value;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Complete generator configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

/// Engine settings shared by every generator through the context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Seed for reproducible output; entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,
    /// Maximum number of source values a buffering strategy materializes
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,
    /// Pool size of the `expand` strategy
    #[serde(default = "default_expand_pool_size")]
    pub expand_pool_size: usize,
    /// Consecutive duplicates after which a unique generator logs a warning
    #[serde(default = "default_unique_warn_threshold")]
    pub unique_warn_threshold: u64,
    /// Consecutive duplicates after which a unique generator gives up
    #[serde(default = "default_unique_error_threshold")]
    pub unique_error_threshold: u64,
}

fn default_cache_size() -> usize {
    100_000
}

fn default_expand_pool_size() -> usize {
    100
}

fn default_unique_warn_threshold() -> u64 {
    100
}

fn default_unique_error_threshold() -> u64 {
    10_000
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: None,
            cache_size: default_cache_size(),
            expand_pool_size: default_expand_pool_size(),
            unique_warn_threshold: default_unique_warn_threshold(),
            unique_error_threshold: default_unique_error_threshold(),
        }
    }
}

/// One generated field
#[derive(Debug, Clone, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    /// Strategy name, see `GeneratorFactory::distribution`
    #[serde(default)]
    pub distribution: Option<String>,
    #[serde(default)]
    pub unique: bool,
}

/// Value domain of a field
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    Long {
        min: i64,
        max: i64,
        #[serde(default = "default_long_granularity")]
        granularity: i64,
    },
    Double {
        min: f64,
        max: f64,
        #[serde(default = "default_double_granularity")]
        granularity: f64,
    },
    Date {
        min: NaiveDate,
        max: NaiveDate,
        #[serde(default = "default_date_granularity")]
        granularity: DateGranularity,
    },
    DateTime {
        min_date: NaiveDate,
        max_date: NaiveDate,
        #[serde(default = "default_date_granularity")]
        date_granularity: DateGranularity,
        min_time: NaiveTime,
        max_time: NaiveTime,
        /// Seconds
        #[serde(default = "default_time_granularity")]
        time_granularity: i64,
        /// Strategy for the time of day; the field's distribution when absent
        #[serde(default)]
        time_distribution: Option<String>,
    },
    /// Redistribute a fixed list of values
    Values { values: Vec<ConfigValue> },
}

fn default_long_granularity() -> i64 {
    1
}

fn default_double_granularity() -> f64 {
    1.0
}

fn default_date_granularity() -> DateGranularity {
    DateGranularity::days(1)
}

fn default_time_granularity() -> i64 {
    1
}

/// Literal value in a `values` list
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Long(i64),
    Double(f64),
    Text(String),
    Record(BTreeMap<String, ConfigValue>),
}

impl From<ConfigValue> for Value {
    fn from(value: ConfigValue) -> Self {
        match value {
            ConfigValue::Bool(b) => Value::Bool(b),
            ConfigValue::Long(v) => Value::Long(v),
            ConfigValue::Double(v) => Value::Double(v),
            ConfigValue::Text(s) => Value::Text(s),
            ConfigValue::Record(fields) => {
                Value::Record(fields.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.seed, None);
        assert_eq!(config.cache_size, 100_000);
        assert_eq!(config.expand_pool_size, 100);
        assert_eq!(config.unique_warn_threshold, 100);
        assert_eq!(config.unique_error_threshold, 10_000);
    }

    #[test]
    fn test_config_value_conversion() {
        let mut fields = BTreeMap::new();
        fields.insert("weight".to_string(), ConfigValue::Long(3));
        let value = Value::from(ConfigValue::Record(fields));
        assert_eq!(value.field("weight"), Some(&Value::Long(3)));
        assert_eq!(Value::from(ConfigValue::Text("x".into())), Value::from("x"));
    }
}
