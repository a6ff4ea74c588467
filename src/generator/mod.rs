//! Producer lifecycle contract
//!
//! A generator is a stateful, pull-based source of values. Every generator, whether a
//! leaf (numbers, constants, lists) or a decorator over another generator, obeys the
//! same small state machine:
//!
//! ```text
//!   Created ──init()──► Running ──close()──► Closed
//!                        │   ▲
//!                        └───┘ reset()
//! ```
//!
//! - `generate()` is only valid in `Running`
//! - `init()` is only valid in `Created`
//! - `close()` is idempotent
//!
//! Violations are programmer errors and surface as [`GeneratorError::IllegalState`].
//!
//! # Result signaling
//!
//! `generate()` returns `Result<Option<T>>`. `Ok(None)` means the generator is
//! depleted for now (a `reset()` may revive it). `Ok(Some(v))` carries a value, which
//! may itself be a domain null such as [`Value::Null`](crate::value::Value::Null).
//!
//! # Example
//!
//! ```
//! use datapulse::generator::{Generator, GeneratorContext, ListGenerator};
//!
//! let mut gen = ListGenerator::new(vec![1, 2]);
//! gen.init(&GeneratorContext::default())?;
//! assert_eq!(gen.generate()?, Some(1));
//! assert_eq!(gen.generate()?, Some(2));
//! assert_eq!(gen.generate()?, None);
//! gen.reset()?;
//! assert_eq!(gen.generate()?, Some(1));
//! gen.close();
//! # Ok::<(), datapulse::GeneratorError>(())
//! ```

pub mod context;
pub mod convert;
pub mod expand;
pub mod sample;
pub mod shared;
pub mod simple;
pub mod unique;
pub mod wrapper;

pub use context::GeneratorContext;
pub use convert::{double_to_number, long_to_number, number_to_value, MappedGenerator, NumberToValue};
pub use expand::ExpandGeneratorProxy;
pub use sample::IndexBasedSampleGeneratorProxy;
pub use shared::SharedGenerator;
pub use simple::{ConstantGenerator, IteratorGenerator, ListGenerator};
pub use unique::UniqueValidatingGenerator;
pub use wrapper::GeneratorWrapper;

use crate::error::{GeneratorError, Result};
use std::fmt;

/// Lifecycle state of a generator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorState {
    Created,
    Running,
    Closed,
}

impl GeneratorState {
    /// Fails unless the generator has not been initialized yet
    pub fn assert_created(self, owner: &str) -> Result<()> {
        match self {
            GeneratorState::Created => Ok(()),
            other => Err(GeneratorError::illegal_state(format!(
                "{} cannot be initialized in state {}",
                owner, other
            ))),
        }
    }

    /// Fails unless the generator is initialized and not closed
    pub fn assert_running(self, owner: &str) -> Result<()> {
        match self {
            GeneratorState::Running => Ok(()),
            GeneratorState::Created => Err(GeneratorError::illegal_state(format!(
                "{} has not been initialized",
                owner
            ))),
            GeneratorState::Closed => Err(GeneratorError::illegal_state(format!(
                "{} has already been closed",
                owner
            ))),
        }
    }

    /// Fails if the generator has been closed
    pub fn assert_not_closed(self, owner: &str) -> Result<()> {
        if self == GeneratorState::Closed {
            return Err(GeneratorError::illegal_state(format!(
                "{} has already been closed",
                owner
            )));
        }
        Ok(())
    }
}

impl fmt::Display for GeneratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratorState::Created => write!(f, "created"),
            GeneratorState::Running => write!(f, "running"),
            GeneratorState::Closed => write!(f, "closed"),
        }
    }
}

/// Generator trait for all value producers
///
/// # Lifecycle
///
/// 1. Create the generator (via `new()` on the concrete type)
/// 2. Call `init()` with a [`GeneratorContext`]
/// 3. Pull values with `generate()`, optionally `reset()` to start over
/// 4. Call `close()` when done
///
/// # Thread Safety
///
/// Generators must be `Send` so that an executor can move them to a worker thread.
/// Whether one instance may be *shared* between threads is advisory and reported by
/// [`is_thread_safe`](Generator::is_thread_safe) and
/// [`is_parallelizable`](Generator::is_parallelizable). Decorators report the logical
/// AND of their source's flags and their own.
pub trait Generator<T>: Send {
    /// Initialize the generator
    ///
    /// Fails with `IllegalState` unless the generator is in `Created`.
    fn init(&mut self, context: &GeneratorContext) -> Result<()>;

    /// Produce the next value
    ///
    /// Returns `Ok(None)` when the generator is depleted. Fails with `IllegalState`
    /// unless the generator is in `Running`.
    fn generate(&mut self) -> Result<Option<T>>;

    /// Start over
    ///
    /// Valid from any state except `Closed`. A generator that was never initialized is
    /// initialized with a default context.
    fn reset(&mut self) -> Result<()>;

    /// Release resources and move to `Closed`; calling it again has no effect
    fn close(&mut self);

    /// Current lifecycle state
    fn state(&self) -> GeneratorState;

    /// Whether one instance may be called concurrently from several threads
    fn is_thread_safe(&self) -> bool {
        false
    }

    /// Whether the generator may be cloned per worker thread
    fn is_parallelizable(&self) -> bool {
        true
    }
}

/// Boxed generator, the form in which producers are composed
pub type BoxedGenerator<T> = Box<dyn Generator<T>>;

impl<T, G: Generator<T> + ?Sized> Generator<T> for Box<G> {
    fn init(&mut self, context: &GeneratorContext) -> Result<()> {
        (**self).init(context)
    }

    fn generate(&mut self) -> Result<Option<T>> {
        (**self).generate()
    }

    fn reset(&mut self) -> Result<()> {
        (**self).reset()
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn state(&self) -> GeneratorState {
        (**self).state()
    }

    fn is_thread_safe(&self) -> bool {
        (**self).is_thread_safe()
    }

    fn is_parallelizable(&self) -> bool {
        (**self).is_parallelizable()
    }
}

/// Pull every remaining value from an initialized generator
///
/// Stops at the first `None`, or after `limit` values when a limit is given.
pub fn drain<T, G: Generator<T> + ?Sized>(generator: &mut G, limit: Option<usize>) -> Result<Vec<T>> {
    let mut values = Vec::new();
    while limit.map_or(true, |l| values.len() < l) {
        match generator.generate()? {
            Some(v) => values.push(v),
            None => break,
        }
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_assertions() {
        assert!(GeneratorState::Created.assert_created("g").is_ok());
        assert!(GeneratorState::Running.assert_created("g").is_err());
        assert!(GeneratorState::Running.assert_running("g").is_ok());

        let err = GeneratorState::Created.assert_running("g").unwrap_err();
        assert!(err.to_string().contains("not been initialized"));

        let err = GeneratorState::Closed.assert_running("g").unwrap_err();
        assert!(err.to_string().contains("closed"));

        assert!(GeneratorState::Closed.assert_not_closed("g").is_err());
        assert!(GeneratorState::Created.assert_not_closed("g").is_ok());
    }

    #[test]
    fn test_lifecycle_violations() {
        let mut gen = ListGenerator::new(vec![1]);
        assert!(matches!(gen.generate(), Err(GeneratorError::IllegalState(_))));

        gen.init(&GeneratorContext::default()).unwrap();
        assert!(matches!(
            gen.init(&GeneratorContext::default()),
            Err(GeneratorError::IllegalState(_))
        ));

        gen.close();
        gen.close();
        assert_eq!(gen.state(), GeneratorState::Closed);
        assert!(matches!(gen.generate(), Err(GeneratorError::IllegalState(_))));
        assert!(matches!(gen.reset(), Err(GeneratorError::IllegalState(_))));
    }

    #[test]
    fn test_reset_from_created_initializes() {
        let mut gen = ListGenerator::new(vec!["a"]);
        gen.reset().unwrap();
        assert_eq!(gen.state(), GeneratorState::Running);
        assert_eq!(gen.generate().unwrap(), Some("a"));
    }

    #[test]
    fn test_boxed_generator_forwards() {
        let mut gen: BoxedGenerator<i32> = Box::new(ListGenerator::new(vec![7, 8]));
        gen.init(&GeneratorContext::default()).unwrap();
        assert_eq!(drain(&mut gen, None).unwrap(), vec![7, 8]);
        assert_eq!(gen.state(), GeneratorState::Running);
    }

    #[test]
    fn test_drain_with_limit() {
        let mut gen = ConstantGenerator::new(3);
        gen.init(&GeneratorContext::default()).unwrap();
        assert_eq!(drain(&mut gen, Some(4)).unwrap(), vec![3, 3, 3, 3]);
    }
}
