//! Shared, non-resettable generator handle
//!
//! Several consumers can hold a [`SharedGenerator`] over the same source. The source is
//! initialized by the first `init()` only, and `reset()`/`close()` on a handle never
//! reach the source, so one consumer cannot rewind or close the stream under another.
//!
//! There is no ordering guarantee between consumers: values are handed out in the order
//! `generate()` calls arrive.

use super::{BoxedGenerator, Generator, GeneratorContext, GeneratorState};
use crate::error::{GeneratorError, Result};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

struct SharedSource<T> {
    source: BoxedGenerator<T>,
    initialized: bool,
}

/// Cloneable handle to a generator shared by several consumers
pub struct SharedGenerator<T> {
    shared: Arc<Mutex<SharedSource<T>>>,
    /// Lifecycle state of this handle, not of the source
    state: GeneratorState,
}

impl<T> SharedGenerator<T> {
    pub fn new(source: BoxedGenerator<T>) -> Self {
        Self {
            shared: Arc::new(Mutex::new(SharedSource {
                source,
                initialized: false,
            })),
            state: GeneratorState::Created,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, SharedSource<T>>> {
        self.shared
            .lock()
            .map_err(|_| GeneratorError::illegal_state("shared generator lock poisoned"))
    }
}

impl<T> Clone for SharedGenerator<T> {
    /// A new handle starts in `Created`; initializing it is a no-op for the source if
    /// another handle already did
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            state: GeneratorState::Created,
        }
    }
}

impl<T: Send> Generator<T> for SharedGenerator<T> {
    /// Repeated calls on a running handle are no-ops
    fn init(&mut self, context: &GeneratorContext) -> Result<()> {
        if self.state == GeneratorState::Running {
            return Ok(());
        }
        self.state.assert_created("SharedGenerator")?;
        {
            let mut shared = self.lock()?;
            if !shared.initialized {
                shared.source.init(context)?;
                shared.initialized = true;
            } else {
                debug!("shared source already initialized, skipping");
            }
        }
        self.state = GeneratorState::Running;
        Ok(())
    }

    fn generate(&mut self) -> Result<Option<T>> {
        self.state.assert_running("SharedGenerator")?;
        self.lock()?.source.generate()
    }

    /// Not forwarded: other consumers keep their position in the stream
    fn reset(&mut self) -> Result<()> {
        if self.state == GeneratorState::Created {
            return self.init(&GeneratorContext::default());
        }
        self.state.assert_not_closed("SharedGenerator")
    }

    /// Not forwarded: only this handle is closed
    fn close(&mut self) {
        self.state = GeneratorState::Closed;
    }

    fn state(&self) -> GeneratorState {
        self.state
    }

    fn is_thread_safe(&self) -> bool {
        self.lock().map(|s| s.source.is_thread_safe()).unwrap_or(false)
    }

    fn is_parallelizable(&self) -> bool {
        self.lock().map(|s| s.source.is_parallelizable()).unwrap_or(false)
    }
}
