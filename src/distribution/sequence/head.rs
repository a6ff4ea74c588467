//! Head sequence
//!
//! Emits only the first `size` values (default 1) and then reports depletion. As a
//! number generator it yields the first `size` grid points; applied to a source it
//! passes the first `size` source values through without materializing anything.
//! Registered as `head` and, with the default size, as `single`.

use super::{GridGenerator, IndexSequence};
use crate::distribution::Distribution;
use crate::error::{GeneratorError, Result};
use crate::generator::{BoxedGenerator, Generator, GeneratorContext, GeneratorState, GeneratorWrapper};
use crate::value::{Number, NumberSpec, Value};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct HeadSequence {
    size: u64,
}

impl HeadSequence {
    /// # Errors
    ///
    /// Fails with a `Config` error if `size` is zero.
    pub fn new(size: u64) -> Result<Self> {
        if size == 0 {
            return Err(GeneratorError::config("head size must be positive"));
        }
        Ok(Self { size })
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

impl Default for HeadSequence {
    fn default() -> Self {
        Self { size: 1 }
    }
}

impl Distribution for HeadSequence {
    fn name(&self) -> &str {
        "head"
    }

    fn create_number_generator(&self, spec: NumberSpec, _unique: bool) -> Result<BoxedGenerator<Number>> {
        spec.validate()?;
        Ok(Box::new(GridGenerator::new(
            "HeadSequence",
            spec,
            HeadIndices {
                size: self.size,
                end: 0,
                next: 0,
            },
        )))
    }

    fn apply_to(self: Arc<Self>, source: BoxedGenerator<Value>, _unique: bool) -> Result<BoxedGenerator<Value>> {
        Ok(Box::new(HeadGenerator::new(source, self.size)))
    }
}

struct HeadIndices {
    size: u64,
    end: u64,
    next: u64,
}

impl IndexSequence for HeadIndices {
    fn rewind(&mut self, spec: &NumberSpec, _rng: &mut Xoshiro256PlusPlus) -> Result<()> {
        self.end = self.size.min(spec.sample_count());
        self.next = 0;
        Ok(())
    }

    fn next_index(&mut self, _rng: &mut Xoshiro256PlusPlus) -> Option<u64> {
        if self.next >= self.end {
            return None;
        }
        self.next += 1;
        Some(self.next - 1)
    }
}

/// Pass-through of the first `size` source values
pub struct HeadGenerator<T> {
    wrapper: GeneratorWrapper<T>,
    size: u64,
    emitted: u64,
}

impl<T> HeadGenerator<T> {
    pub fn new(source: BoxedGenerator<T>, size: u64) -> Self {
        Self {
            wrapper: GeneratorWrapper::new("HeadGenerator", source),
            size,
            emitted: 0,
        }
    }
}

impl<T> Generator<T> for HeadGenerator<T> {
    fn init(&mut self, context: &GeneratorContext) -> Result<()> {
        self.wrapper.init_source(context)?;
        self.emitted = 0;
        Ok(())
    }

    fn generate(&mut self) -> Result<Option<T>> {
        self.wrapper.state().assert_running(self.wrapper.owner())?;
        if self.emitted >= self.size {
            return Ok(None);
        }
        let next = self.wrapper.generate_from_source()?;
        if next.is_some() {
            self.emitted += 1;
        }
        Ok(next)
    }

    fn reset(&mut self) -> Result<()> {
        self.emitted = 0;
        self.wrapper.reset_source().map(|_| ())
    }

    fn close(&mut self) {
        self.wrapper.close_source()
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::sequence::test_support::longs;
    use crate::generator::{drain, IteratorGenerator};

    #[test]
    fn test_head_numbers() {
        let head = HeadSequence::new(3).unwrap();
        assert_eq!(longs(&head, NumberSpec::long(10, 100, 10), false, 100), vec![10, 20, 30]);
        assert_eq!(longs(&HeadSequence::default(), NumberSpec::long(10, 100, 10), false, 100), vec![10]);
        assert_eq!(longs(&head, NumberSpec::long(1, 2, 1), false, 100), vec![1, 2]);
    }

    #[test]
    fn test_head_streams_unbounded_source() {
        let source = IteratorGenerator::new(|| (0i64..).map(Value::Long));
        let mut gen = Arc::new(HeadSequence::new(2).unwrap()).apply_to(Box::new(source), false).unwrap();
        gen.init(&GeneratorContext::default()).unwrap();
        assert_eq!(drain(&mut gen, None).unwrap(), vec![Value::Long(0), Value::Long(1)]);

        gen.reset().unwrap();
        assert_eq!(gen.generate().unwrap(), Some(Value::Long(0)));
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(matches!(HeadSequence::new(0), Err(GeneratorError::Config(_))));
    }
}
