//! Leaf generators over fixed data
//!
//! - [`ConstantGenerator`]: one value, forever or once
//! - [`ListGenerator`]: a fixed list in order, then depletion
//! - [`IteratorGenerator`]: values from a restartable iterator factory

use super::{Generator, GeneratorContext, GeneratorState};
use crate::error::Result;

/// Generator that always returns the same value
///
/// In `once` mode the value is produced a single time per pass, which is what a
/// unique one-element sample needs.
#[derive(Debug, Clone)]
pub struct ConstantGenerator<T> {
    value: T,
    once: bool,
    emitted: bool,
    state: GeneratorState,
}

impl<T: Clone + Send> ConstantGenerator<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            once: false,
            emitted: false,
            state: GeneratorState::Created,
        }
    }

    /// Generator that yields `value` once and then reports depletion until reset
    pub fn once(value: T) -> Self {
        Self {
            once: true,
            ..Self::new(value)
        }
    }
}

impl<T: Clone + Send> Generator<T> for ConstantGenerator<T> {
    fn init(&mut self, _context: &GeneratorContext) -> Result<()> {
        self.state.assert_created("ConstantGenerator")?;
        self.emitted = false;
        self.state = GeneratorState::Running;
        Ok(())
    }

    fn generate(&mut self) -> Result<Option<T>> {
        self.state.assert_running("ConstantGenerator")?;
        if self.once && self.emitted {
            return Ok(None);
        }
        self.emitted = true;
        Ok(Some(self.value.clone()))
    }

    fn reset(&mut self) -> Result<()> {
        if self.state == GeneratorState::Created {
            return self.init(&GeneratorContext::default());
        }
        self.state.assert_not_closed("ConstantGenerator")?;
        self.emitted = false;
        Ok(())
    }

    fn close(&mut self) {
        self.state = GeneratorState::Closed;
    }

    fn state(&self) -> GeneratorState {
        self.state
    }

    fn is_thread_safe(&self) -> bool {
        !self.once
    }
}

/// Generator over a fixed list of values
///
/// Yields the values in order and then `None`; `reset()` rewinds to the start.
#[derive(Debug, Clone)]
pub struct ListGenerator<T> {
    values: Vec<T>,
    cursor: usize,
    state: GeneratorState,
}

impl<T: Clone + Send> ListGenerator<T> {
    pub fn new(values: Vec<T>) -> Self {
        Self {
            values,
            cursor: 0,
            state: GeneratorState::Created,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<T: Clone + Send> Generator<T> for ListGenerator<T> {
    fn init(&mut self, _context: &GeneratorContext) -> Result<()> {
        self.state.assert_created("ListGenerator")?;
        self.cursor = 0;
        self.state = GeneratorState::Running;
        Ok(())
    }

    fn generate(&mut self) -> Result<Option<T>> {
        self.state.assert_running("ListGenerator")?;
        let value = self.values.get(self.cursor).cloned();
        if value.is_some() {
            self.cursor += 1;
        }
        Ok(value)
    }

    fn reset(&mut self) -> Result<()> {
        if self.state == GeneratorState::Created {
            return self.init(&GeneratorContext::default());
        }
        self.state.assert_not_closed("ListGenerator")?;
        self.cursor = 0;
        Ok(())
    }

    fn close(&mut self) {
        self.state = GeneratorState::Closed;
    }

    fn state(&self) -> GeneratorState {
        self.state
    }
}

type IteratorFactory<T> = Box<dyn Fn() -> Box<dyn Iterator<Item = T> + Send> + Send>;

/// Generator backed by an iterator factory
///
/// The factory is called at `init()` and on every `reset()`, so the source may be
/// unbounded or non-deterministic. Used to feed lazily computed streams into the
/// sampling proxies.
pub struct IteratorGenerator<T> {
    factory: IteratorFactory<T>,
    iter: Option<Box<dyn Iterator<Item = T> + Send>>,
    state: GeneratorState,
}

impl<T> IteratorGenerator<T> {
    pub fn new<F, I>(factory: F) -> Self
    where
        F: Fn() -> I + Send + 'static,
        I: Iterator<Item = T> + Send + 'static,
    {
        Self {
            factory: Box::new(move || Box::new(factory())),
            iter: None,
            state: GeneratorState::Created,
        }
    }
}

impl<T: Send> Generator<T> for IteratorGenerator<T> {
    fn init(&mut self, _context: &GeneratorContext) -> Result<()> {
        self.state.assert_created("IteratorGenerator")?;
        self.iter = Some((self.factory)());
        self.state = GeneratorState::Running;
        Ok(())
    }

    fn generate(&mut self) -> Result<Option<T>> {
        self.state.assert_running("IteratorGenerator")?;
        Ok(self.iter.as_mut().and_then(|it| it.next()))
    }

    fn reset(&mut self) -> Result<()> {
        if self.state == GeneratorState::Created {
            return self.init(&GeneratorContext::default());
        }
        self.state.assert_not_closed("IteratorGenerator")?;
        self.iter = Some((self.factory)());
        Ok(())
    }

    fn close(&mut self) {
        self.iter = None;
        self.state = GeneratorState::Closed;
    }

    fn state(&self) -> GeneratorState {
        self.state
    }
}
