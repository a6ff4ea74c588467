//! Decorator base
//!
//! [`GeneratorWrapper`] owns a source generator together with the decorator's own
//! lifecycle state and forwards lifecycle calls to the source. Decorators embed it and
//! call the forwarding methods from their `Generator` impl. A decorator that must *not*
//! forward a call (see [`SharedGenerator`](super::SharedGenerator)) says so in its own
//! impl instead of calling the wrapper.

use super::{BoxedGenerator, Generator, GeneratorContext, GeneratorState};
use crate::error::Result;

/// Source generator plus the decorator's lifecycle state
pub struct GeneratorWrapper<S> {
    source: BoxedGenerator<S>,
    state: GeneratorState,
    /// Decorator name used in error messages
    owner: &'static str,
}

impl<S> GeneratorWrapper<S> {
    pub fn new(owner: &'static str, source: BoxedGenerator<S>) -> Self {
        Self {
            source,
            state: GeneratorState::Created,
            owner,
        }
    }

    pub fn owner(&self) -> &'static str {
        self.owner
    }

    pub fn state(&self) -> GeneratorState {
        self.state
    }

    pub fn source_mut(&mut self) -> &mut BoxedGenerator<S> {
        &mut self.source
    }

    /// Initialize the source and move the decorator to `Running`
    pub fn init_source(&mut self, context: &GeneratorContext) -> Result<()> {
        self.state.assert_created(self.owner)?;
        self.source.init(context)?;
        self.state = GeneratorState::Running;
        Ok(())
    }

    /// Reset the source
    ///
    /// Returns `true` when the call initialized a never-initialized decorator, in which
    /// case the caller has nothing left to reset.
    pub fn reset_source(&mut self) -> Result<bool> {
        if self.state == GeneratorState::Created {
            self.init_source(&GeneratorContext::default())?;
            return Ok(true);
        }
        self.state.assert_not_closed(self.owner)?;
        self.source.reset()?;
        Ok(false)
    }

    pub fn close_source(&mut self) {
        self.source.close();
        self.state = GeneratorState::Closed;
    }

    /// Pull the next value from the source, checking the decorator's state first
    pub fn generate_from_source(&mut self) -> Result<Option<S>> {
        self.state.assert_running(self.owner)?;
        self.source.generate()
    }

    pub fn source_thread_safe(&self) -> bool {
        self.source.is_thread_safe()
    }

    pub fn source_parallelizable(&self) -> bool {
        self.source.is_parallelizable()
    }
}
