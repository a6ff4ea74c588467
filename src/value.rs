//! Domain values and numeric range descriptions
//!
//! [`Value`] is the dynamic value that flows through producers built by a
//! distribution's `apply_to`. [`Value::Null`] is legitimate domain data and is never
//! used to signal depletion; that is the job of the `Option` returned by
//! `Generator::generate`.
//!
//! [`NumberSpec`] is the `(type, min, max, granularity)` tuple every numeric generator
//! is created from. Numeric generators work on the *grid* of a spec: the points
//! `min, min + granularity, min + 2 * granularity, ...` that do not exceed `max`.

use crate::error::{GeneratorError, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Dynamic domain value
///
/// Doubles compare and hash by bit pattern so that `Value` can be used as a key in the
/// uniqueness checks (`0.0` and `-0.0` are distinct, `NaN` equals itself).
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Long(i64),
    Double(f64),
    Text(String),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Record(BTreeMap<String, Value>),
}

impl Value {
    /// Numeric view of the value, used by weight functions
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Long(v) => Some(*v as f64),
            Value::Double(v) => Some(*v),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Look up a field of a record value
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Record(fields) => fields.get(name),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Long(v) => v.hash(state),
            Value::Double(v) => v.to_bits().hash(state),
            Value::Text(s) => s.hash(state),
            Value::Date(d) => d.hash(state),
            Value::Time(t) => t.hash(state),
            Value::DateTime(dt) => dt.hash(state),
            Value::Record(fields) => fields.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Long(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::Text(s) => write!(f, "{}", s),
            Value::Date(d) => write!(f, "{}", d),
            Value::Time(t) => write!(f, "{}", t),
            Value::DateTime(dt) => write!(f, "{}", dt),
            Value::Record(fields) => {
                write!(f, "{{")?;
                for (i, (k, v)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        match n {
            Number::Long(v) => Value::Long(v),
            Number::Double(v) => Value::Double(v),
        }
    }
}

/// A number produced by a numeric generator
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Number {
    Long(i64),
    Double(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Long(v) => v as f64,
            Number::Double(v) => v,
        }
    }

    /// Integer view; doubles are truncated toward zero
    pub fn as_i64(self) -> i64 {
        match self {
            Number::Long(v) => v,
            Number::Double(v) => v as i64,
        }
    }

    /// Grid index of a value, used when a number generator drives list sampling
    pub fn as_index(self) -> usize {
        match self {
            Number::Long(v) => v.max(0) as usize,
            Number::Double(v) => v.max(0.0) as usize,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Long(v) => write!(f, "{}", v),
            Number::Double(v) => write!(f, "{}", v),
        }
    }
}

/// Numeric type requested from a distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberType {
    Long,
    Double,
}

/// Bounds and step of a numeric generator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberSpec {
    Long { min: i64, max: i64, granularity: i64 },
    Double { min: f64, max: f64, granularity: f64 },
}

impl NumberSpec {
    pub fn long(min: i64, max: i64, granularity: i64) -> Self {
        NumberSpec::Long { min, max, granularity }
    }

    pub fn double(min: f64, max: f64, granularity: f64) -> Self {
        NumberSpec::Double { min, max, granularity }
    }

    /// Grid over the indices of a list of `len` elements
    pub fn indices(len: usize) -> Self {
        NumberSpec::Long {
            min: 0,
            max: len.saturating_sub(1) as i64,
            granularity: 1,
        }
    }

    pub fn number_type(&self) -> NumberType {
        match self {
            NumberSpec::Long { .. } => NumberType::Long,
            NumberSpec::Double { .. } => NumberType::Double,
        }
    }

    /// Check the static parameters
    pub fn validate(&self) -> Result<()> {
        match *self {
            NumberSpec::Long { min, max, granularity } => {
                if min > max {
                    return Err(GeneratorError::config(format!(
                        "min ({}) must not be greater than max ({})",
                        min, max
                    )));
                }
                if granularity <= 0 {
                    return Err(GeneratorError::config(format!(
                        "granularity must be positive, got {}",
                        granularity
                    )));
                }
            }
            NumberSpec::Double { min, max, granularity } => {
                if !min.is_finite() || !max.is_finite() {
                    return Err(GeneratorError::config(format!(
                        "bounds must be finite, got [{}, {}]",
                        min, max
                    )));
                }
                if min > max {
                    return Err(GeneratorError::config(format!(
                        "min ({}) must not be greater than max ({})",
                        min, max
                    )));
                }
                if !(granularity > 0.0) || !granularity.is_finite() {
                    return Err(GeneratorError::config(format!(
                        "granularity must be positive, got {}",
                        granularity
                    )));
                }
            }
        }
        Ok(())
    }

    /// Number of grid points: `floor((max - min) / granularity) + 1`
    ///
    /// Saturates at `u64::MAX` for ranges that span the whole `i64` domain.
    pub fn sample_count(&self) -> u64 {
        match *self {
            NumberSpec::Long { min, max, granularity } => {
                let span = (max as i128 - min as i128) as u128;
                let steps = span / granularity.max(1) as u128;
                u64::try_from(steps + 1).unwrap_or(u64::MAX)
            }
            NumberSpec::Double { min, max, granularity } => {
                let steps = ((max - min) / granularity + 1e-9).floor();
                if steps >= u64::MAX as f64 {
                    u64::MAX
                } else {
                    steps as u64 + 1
                }
            }
        }
    }

    pub fn min(&self) -> Number {
        match *self {
            NumberSpec::Long { min, .. } => Number::Long(min),
            NumberSpec::Double { min, .. } => Number::Double(min),
        }
    }

    pub fn max(&self) -> Number {
        match *self {
            NumberSpec::Long { max, .. } => Number::Long(max),
            NumberSpec::Double { max, .. } => Number::Double(max),
        }
    }

    pub fn granularity(&self) -> Number {
        match *self {
            NumberSpec::Long { granularity, .. } => Number::Long(granularity),
            NumberSpec::Double { granularity, .. } => Number::Double(granularity),
        }
    }

    /// The grid point with the given index
    pub fn value_at(&self, index: u64) -> Number {
        match *self {
            NumberSpec::Long { min, max, granularity } => {
                let v = min as i128 + index as i128 * granularity as i128;
                Number::Long(v.min(max as i128) as i64)
            }
            NumberSpec::Double { min, max, granularity } => {
                Number::Double((min + index as f64 * granularity).min(max))
            }
        }
    }

    /// Index of the grid point at or below `x`, or `None` if `x` is outside the range
    pub fn floor_index(&self, x: f64) -> Option<u64> {
        let (min, max, granularity) = match *self {
            NumberSpec::Long { min, max, granularity } => (min as f64, max as f64, granularity as f64),
            NumberSpec::Double { min, max, granularity } => (min, max, granularity),
        };
        if !x.is_finite() || x < min || x > max {
            return None;
        }
        let index = ((x - min) / granularity + 1e-9).floor() as u64;
        Some(index.min(self.sample_count() - 1))
    }
}
