//! Generator context
//!
//! The context is handed to every generator at `init()` time. It carries the engine
//! settings (cache size, uniqueness thresholds) and is the single place generators get
//! their PRNG from.
//!
//! # Seeding
//!
//! Each call to [`GeneratorContext::new_rng`] returns an independent
//! xoshiro256++ instance. With a configured seed the n-th RNG handed out is the stream
//! seeded from `seed`, jumped ahead `n` times (2^128 draws per jump), so a whole
//! generator graph is reproducible as long as it is initialized in the same order and
//! no two generators share a stream. Without a seed every RNG is seeded from entropy.

use crate::config::GeneratorConfig;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Shared, cheaply cloneable generator context
#[derive(Debug, Clone)]
pub struct GeneratorContext {
    inner: Arc<ContextInner>,
}

#[derive(Debug)]
struct ContextInner {
    config: GeneratorConfig,
    /// Number of RNGs handed out so far
    rng_counter: AtomicU64,
}

impl GeneratorContext {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                config,
                rng_counter: AtomicU64::new(0),
            }),
        }
    }

    /// Context with default settings and a fixed seed
    ///
    /// Useful for reproducible tests.
    pub fn with_seed(seed: u64) -> Self {
        Self::new(GeneratorConfig {
            seed: Some(seed),
            ..GeneratorConfig::default()
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.inner.config
    }

    /// Upper bound on the number of values a buffering proxy materializes
    pub fn cache_size(&self) -> usize {
        self.inner.config.cache_size
    }

    /// Create a fresh PRNG for one generator
    pub fn new_rng(&self) -> Xoshiro256PlusPlus {
        match self.inner.config.seed {
            Some(seed) => {
                let n = self.inner.rng_counter.fetch_add(1, Ordering::Relaxed);
                let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
                for _ in 0..n {
                    rng.jump();
                }
                rng
            }
            None => Xoshiro256PlusPlus::from_entropy(),
        }
    }
}

impl Default for GeneratorContext {
    fn default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}
