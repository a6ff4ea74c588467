//! Named strategy registry
//!
//! Maps stable strategy names to canonical distribution instances. Distributions are
//! stateless, so one shared instance per name serves every generator graph.
//!
//! Code that builds generators takes a `&SequenceRegistry` explicitly; the lazily built
//! [`SequenceRegistry::global`] instance is only a convenience for callers that do not
//! need their own table.

use super::sequence::{
    BitReverseSequence, CumulatedSequence, ExpandSequence, FibonacciSequence, HeadSequence, IncrementSequence,
    PadovanSequence, RandomSequence, RandomWalkSequence, ShuffleSequence, StepSequence, WedgeSequence,
};
use super::Distribution;
use crate::error::{GeneratorError, Result};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};
use tracing::debug;

/// Name → distribution table
#[derive(Debug, Default)]
pub struct SequenceRegistry {
    sequences: RwLock<HashMap<String, Arc<dyn Distribution>>>,
}

impl SequenceRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry populated with every built-in sequence
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.register("random", Arc::new(RandomSequence));
        registry.register("shuffle", Arc::new(ShuffleSequence::default()));
        registry.register("cumulated", Arc::new(CumulatedSequence::default()));
        registry.register("randomWalk", Arc::new(RandomWalkSequence::default()));
        registry.register("step", Arc::new(StepSequence::default()));
        registry.register("increment", Arc::new(IncrementSequence));
        registry.register("wedge", Arc::new(WedgeSequence));
        registry.register("bitreverse", Arc::new(BitReverseSequence));
        registry.register("expand", Arc::new(ExpandSequence::default()));
        registry.register("fibonacci", Arc::new(FibonacciSequence));
        registry.register("padovan", Arc::new(PadovanSequence));

        let head: Arc<dyn Distribution> = Arc::new(HeadSequence::default());
        registry.register("head", Arc::clone(&head));
        registry.register("single", head);
        registry
    }

    /// Process-wide registry with the built-in sequences, built on first use
    pub fn global() -> &'static SequenceRegistry {
        static GLOBAL: OnceLock<SequenceRegistry> = OnceLock::new();
        GLOBAL.get_or_init(SequenceRegistry::with_defaults)
    }

    /// Register `sequence` under `name`, replacing any previous entry
    pub fn register(&self, name: impl Into<String>, sequence: Arc<dyn Distribution>) {
        let name = name.into();
        debug!(name = %name, strategy = sequence.name(), "registering sequence");
        match self.sequences.write() {
            Ok(mut sequences) => {
                sequences.insert(name, sequence);
            }
            Err(poisoned) => {
                poisoned.into_inner().insert(name, sequence);
            }
        }
    }

    /// Look up a sequence by name
    ///
    /// An unknown name is a `Config` error when `required`, and `Ok(None)` otherwise.
    pub fn get_registered_sequence(&self, name: &str, required: bool) -> Result<Option<Arc<dyn Distribution>>> {
        let found = match self.sequences.read() {
            Ok(sequences) => sequences.get(name).cloned(),
            Err(poisoned) => poisoned.into_inner().get(name).cloned(),
        };
        match found {
            Some(sequence) => Ok(Some(sequence)),
            None if required => Err(GeneratorError::config(format!(
                "no sequence registered under the name '{}'",
                name
            ))),
            None => Ok(None),
        }
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = match self.sequences.read() {
            Ok(sequences) => sequences.keys().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().keys().cloned().collect(),
        };
        names.sort();
        names
    }
}
