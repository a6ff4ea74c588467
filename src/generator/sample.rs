//! Buffering sampler
//!
//! [`IndexBasedSampleGeneratorProxy`] materializes its source into a list once and then
//! lets a distribution decide which list positions to emit: the distribution is asked
//! for a number generator over the index grid `0..=len-1` and every index it produces
//! is mapped to the list element at that position.
//!
//! # Materialization limits
//!
//! At most `cache_size` values (from the [`GeneratorContext`]) are pulled. If the source
//! has more, a warning is logged, the list is truncated and
//! [`is_truncated`](IndexBasedSampleGeneratorProxy::is_truncated) reports it.
//!
//! # Reset
//!
//! `reset()` resets the source and materializes it again, so a non-deterministic source
//! may yield a different list after a reset.

use super::{drain, BoxedGenerator, ConstantGenerator, Generator, GeneratorContext, GeneratorState, GeneratorWrapper};
use crate::distribution::Distribution;
use crate::error::{GeneratorError, Result};
use crate::value::{Number, NumberSpec};
use std::sync::Arc;
use tracing::{debug, warn};

/// How positions of the materialized list are chosen
enum Sampler<T> {
    /// Nothing materialized, always depleted
    Empty,
    /// Single element, no index generator needed
    Constant(ConstantGenerator<T>),
    /// Positions come from the distribution's number generator
    Indexed(BoxedGenerator<Number>),
}

/// Proxy that redistributes a materialized source according to a distribution
pub struct IndexBasedSampleGeneratorProxy<T> {
    wrapper: GeneratorWrapper<T>,
    distribution: Arc<dyn Distribution>,
    unique: bool,
    context: Option<GeneratorContext>,
    values: Vec<T>,
    truncated: bool,
    sampler: Sampler<T>,
}

impl<T: Clone + Send + 'static> IndexBasedSampleGeneratorProxy<T> {
    pub fn new(source: BoxedGenerator<T>, distribution: Arc<dyn Distribution>, unique: bool) -> Self {
        Self {
            wrapper: GeneratorWrapper::new("IndexBasedSampleGeneratorProxy", source),
            distribution,
            unique,
            context: None,
            values: Vec::new(),
            truncated: false,
            sampler: Sampler::Empty,
        }
    }

    /// Whether the last materialization hit the cache size limit
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Number of materialized values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Pull the source into memory and build the sampler for it
    ///
    /// Nothing is stored unless every step succeeds.
    fn materialize(&mut self, context: &GeneratorContext) -> Result<()> {
        let limit = context.cache_size();
        let mut values = drain(self.wrapper.source_mut(), Some(limit))?;
        let truncated = values.len() == limit && self.wrapper.source_mut().generate()?.is_some();
        if truncated {
            warn!(
                limit,
                distribution = self.distribution.name(),
                "source exceeds the cache size, sampling from the first values only"
            );
        }

        let sampler = match values.len() {
            0 => Sampler::Empty,
            1 => {
                let value = values[0].clone();
                let mut constant = if self.unique {
                    ConstantGenerator::once(value)
                } else {
                    ConstantGenerator::new(value)
                };
                constant.init(context)?;
                Sampler::Constant(constant)
            }
            len => {
                let mut indices = self
                    .distribution
                    .create_number_generator(NumberSpec::indices(len), self.unique)?;
                indices.init(context)?;
                Sampler::Indexed(indices)
            }
        };

        debug!(
            count = values.len(),
            distribution = self.distribution.name(),
            "materialized source"
        );
        values.shrink_to_fit();
        self.values = values;
        self.truncated = truncated;
        self.sampler = sampler;
        Ok(())
    }
}

impl<T: Clone + Send + 'static> Generator<T> for IndexBasedSampleGeneratorProxy<T> {
    fn init(&mut self, context: &GeneratorContext) -> Result<()> {
        self.wrapper.init_source(context)?;
        self.context = Some(context.clone());
        self.materialize(context)
    }

    fn generate(&mut self) -> Result<Option<T>> {
        self.wrapper.state().assert_running(self.wrapper.owner())?;
        match &mut self.sampler {
            Sampler::Empty => Ok(None),
            Sampler::Constant(constant) => constant.generate(),
            Sampler::Indexed(indices) => match indices.generate()? {
                Some(index) => {
                    let position = index.as_index();
                    self.values.get(position).cloned().map(Some).ok_or_else(|| {
                        GeneratorError::illegal_state(format!(
                            "distribution '{}' produced index {} for {} values",
                            self.distribution.name(),
                            position,
                            self.values.len()
                        ))
                    })
                }
                None => Ok(None),
            },
        }
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
        match &mut self.sampler {
            Sampler::Constant(constant) => constant.close(),
            Sampler::Indexed(indices) => indices.close(),
            Sampler::Empty => {}
        }
        self.values.clear();
        self.wrapper.close_source();
    }

    fn state(&self) -> GeneratorState {
        self.wrapper.state()
    }

    fn is_thread_safe(&self) -> bool {
        false
    }

    fn is_parallelizable(&self) -> bool {
        self.wrapper.source_parallelizable()
    }
}
