//! Uniqueness-validating decorator
//!
//! Retries the source until it produces a value that has not been seen in the current
//! pass. A streak of duplicates first logs a warning and, if it keeps going, fails
//! with `IllegalState`, so a poorly parameterized source (say, 10 values requested
//! from a 5-value range) cannot spin forever.

use super::{BoxedGenerator, Generator, GeneratorContext, GeneratorState, GeneratorWrapper};
use crate::error::{GeneratorError, Result};
use std::collections::HashSet;
use std::hash::Hash;
use tracing::warn;

/// Default number of consecutive duplicates before a warning is logged
pub const DEFAULT_WARN_THRESHOLD: u64 = 100;

/// Default number of consecutive duplicates before generation fails
pub const DEFAULT_ERROR_THRESHOLD: u64 = 10_000;

/// Decorator that only lets values through that were not produced before
pub struct UniqueValidatingGenerator<T> {
    wrapper: GeneratorWrapper<T>,
    seen: HashSet<T>,
    warn_threshold: u64,
    error_threshold: u64,
    /// Thresholds were set explicitly and must not be taken from the context
    explicit_thresholds: bool,
}

impl<T: Eq + Hash + Clone + Send> UniqueValidatingGenerator<T> {
    pub fn new(source: BoxedGenerator<T>) -> Self {
        Self {
            wrapper: GeneratorWrapper::new("UniqueValidatingGenerator", source),
            seen: HashSet::new(),
            warn_threshold: DEFAULT_WARN_THRESHOLD,
            error_threshold: DEFAULT_ERROR_THRESHOLD,
            explicit_thresholds: false,
        }
    }

    /// Override the thresholds configured in the generator context
    pub fn with_thresholds(mut self, warn_threshold: u64, error_threshold: u64) -> Self {
        self.warn_threshold = warn_threshold;
        self.error_threshold = error_threshold.max(warn_threshold);
        self.explicit_thresholds = true;
        self
    }

    /// Number of distinct values produced in the current pass
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}

impl<T: Eq + Hash + Clone + Send> Generator<T> for UniqueValidatingGenerator<T> {
    fn init(&mut self, context: &GeneratorContext) -> Result<()> {
        if !self.explicit_thresholds {
            let config = context.config();
            self.warn_threshold = config.unique_warn_threshold;
            self.error_threshold = config.unique_error_threshold.max(config.unique_warn_threshold);
        }
        self.wrapper.init_source(context)
    }

    fn generate(&mut self) -> Result<Option<T>> {
        let mut duplicates = 0u64;
        loop {
            let value = match self.wrapper.generate_from_source()? {
                Some(v) => v,
                None => return Ok(None),
            };
            if self.seen.insert(value.clone()) {
                return Ok(Some(value));
            }

            duplicates += 1;
            if duplicates == self.warn_threshold {
                warn!(
                    duplicates,
                    distinct = self.seen.len(),
                    "unique generator keeps producing duplicates"
                );
            }
            if duplicates >= self.error_threshold {
                return Err(GeneratorError::illegal_state(format!(
                    "unique generator produced {} duplicates in a row after {} distinct values",
                    duplicates,
                    self.seen.len()
                )));
            }
        }
    }

    fn reset(&mut self) -> Result<()> {
        self.seen.clear();
        self.wrapper.reset_source().map(|_| ())
    }

    fn close(&mut self) {
        self.seen.clear();
        self.wrapper.close_source()
    }

    fn state(&self) -> GeneratorState {
        self.wrapper.state()
    }

    /// The seen set is unsynchronized state of its own
    fn is_thread_safe(&self) -> bool {
        false
    }

    fn is_parallelizable(&self) -> bool {
        false
    }
}
