//! Expand sequence
//!
//! Streaming strategy for large or unbounded sources. Values are pulled into a bounded
//! pool and random pool members are emitted (see [`ExpandGeneratorProxy`]). Unlike the
//! other sequences, `apply_to` never materializes the source.
//!
//! Numeric generation feeds the ascending grid through the same pool, which gives a
//! locally shuffled walk from `min` to `max` that works for ranges of any size.

use super::StepSequence;
use crate::distribution::Distribution;
use crate::error::Result;
use crate::generator::{BoxedGenerator, ExpandGeneratorProxy};
use crate::value::{Number, NumberSpec, Value};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct ExpandSequence {
    pool_size: Option<usize>,
    duplication_quota: f64,
}

impl ExpandSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixed pool size; without it the context's `expand_pool_size` is used
    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = Some(pool_size);
        self
    }

    /// Probability that an emitted value stays in the pool (non-unique mode)
    pub fn with_duplication_quota(mut self, quota: f64) -> Self {
        self.duplication_quota = quota;
        self
    }

    fn proxy<T: Clone + Send>(&self, source: BoxedGenerator<T>, unique: bool) -> ExpandGeneratorProxy<T> {
        let proxy = ExpandGeneratorProxy::new(source, unique).with_duplication_quota(self.duplication_quota);
        match self.pool_size {
            Some(size) => proxy.with_pool_size(size),
            None => proxy,
        }
    }
}

impl Distribution for ExpandSequence {
    fn name(&self) -> &str {
        "expand"
    }

    fn create_number_generator(&self, spec: NumberSpec, unique: bool) -> Result<BoxedGenerator<Number>> {
        let grid = StepSequence::default().create_number_generator(spec, false)?;
        Ok(Box::new(self.proxy(grid, unique)))
    }

    fn apply_to(self: Arc<Self>, source: BoxedGenerator<Value>, unique: bool) -> Result<BoxedGenerator<Value>> {
        Ok(Box::new(self.proxy(source, unique)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::sequence::test_support::longs;
    use crate::generator::{drain, GeneratorContext, IteratorGenerator};
    use std::collections::HashSet;

    #[test]
    fn test_unique_covers_grid() {
        let expand = ExpandSequence::new().with_pool_size(8);
        let values = longs(&expand, NumberSpec::long(0, 199, 1), true, 1000);
        assert_eq!(values.len(), 200);
        let distinct: HashSet<i64> = values.iter().copied().collect();
        assert_eq!(distinct.len(), 200);
    }

    #[test]
    fn test_huge_range_is_streamed() {
        let values = longs(&ExpandSequence::new(), NumberSpec::long(0, i64::MAX, 1), true, 500);
        assert_eq!(values.len(), 500);
        // Default pool of 100 lags at most 100 values behind the walk
        assert!(values.iter().all(|&v| v < 600));
    }

    #[test]
    fn test_apply_to_unbounded_source() {
        let source = IteratorGenerator::new(|| (0i64..).map(Value::Long));
        let mut gen = Arc::new(ExpandSequence::new().with_pool_size(4))
            .apply_to(Box::new(source), true)
            .unwrap();
        gen.init(&GeneratorContext::with_seed(3)).unwrap();
        let values = drain(&mut gen, Some(100)).unwrap();
        assert_eq!(values.len(), 100);
        let distinct: HashSet<Value> = values.into_iter().collect();
        assert_eq!(distinct.len(), 100);
    }
}
