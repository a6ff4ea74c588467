//! Streaming random redistribution
//!
//! [`ExpandGeneratorProxy`] is the alternative to full materialization for large or
//! unbounded sources. It keeps a bounded pool of source values and emits random pool
//! members:
//!
//! - **unique**: an emitted value leaves the pool and is replaced by the next source
//!   value; every source value is emitted exactly once.
//! - **non-unique**: an emitted value stays in the pool unless it is swapped for fresh
//!   source data. The swap happens with probability `1 - duplication_quota`, so a quota
//!   of 0 moves through the source as fast as possible and a quota close to 1 repeats
//!   pool members. Once the source is depleted the pool is sampled with replacement.

use super::{BoxedGenerator, Generator, GeneratorContext, GeneratorState, GeneratorWrapper};
use crate::error::Result;
use rand::Rng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Bounded-pool random redistribution of a source
pub struct ExpandGeneratorProxy<T> {
    wrapper: GeneratorWrapper<T>,
    pool: Vec<T>,
    pool_size: Option<usize>,
    duplication_quota: f64,
    unique: bool,
    source_depleted: bool,
    rng: Option<Xoshiro256PlusPlus>,
}

impl<T: Clone + Send> ExpandGeneratorProxy<T> {
    pub fn new(source: BoxedGenerator<T>, unique: bool) -> Self {
        Self {
            wrapper: GeneratorWrapper::new("ExpandGeneratorProxy", source),
            pool: Vec::new(),
            pool_size: None,
            duplication_quota: 0.0,
            unique,
            source_depleted: false,
            rng: None,
        }
    }

    /// Fixed pool size instead of the context's `expand_pool_size`
    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = Some(pool_size.max(1));
        self
    }

    /// Probability of keeping an emitted value in the pool (non-unique mode only)
    pub fn with_duplication_quota(mut self, quota: f64) -> Self {
        self.duplication_quota = quota.clamp(0.0, 1.0);
        self
    }

    fn pull(&mut self) -> Result<Option<T>> {
        if self.source_depleted {
            return Ok(None);
        }
        let next = self.wrapper.source_mut().generate()?;
        if next.is_none() {
            self.source_depleted = true;
        }
        Ok(next)
    }

    fn fill_pool(&mut self) -> Result<()> {
        let capacity = self.pool_size.unwrap_or(1);
        while self.pool.len() < capacity {
            match self.pull()? {
                Some(value) => self.pool.push(value),
                None => break,
            }
        }
        Ok(())
    }
}

impl<T: Clone + Send> Generator<T> for ExpandGeneratorProxy<T> {
    fn init(&mut self, context: &GeneratorContext) -> Result<()> {
        self.wrapper.init_source(context)?;
        if self.pool_size.is_none() {
            self.pool_size = Some(context.config().expand_pool_size.max(1));
        }
        self.rng = Some(context.new_rng());
        self.pool.clear();
        self.source_depleted = false;
        Ok(())
    }

    fn generate(&mut self) -> Result<Option<T>> {
        self.wrapper.state().assert_running(self.wrapper.owner())?;
        self.fill_pool()?;
        if self.pool.is_empty() {
            return Ok(None);
        }

        let rng = match self.rng.as_mut() {
            Some(rng) => rng,
            None => return Ok(None),
        };
        let index = rng.gen_range(0..self.pool.len());
        if self.unique {
            return Ok(Some(self.pool.swap_remove(index)));
        }

        let keep = rng.gen::<f64>() < self.duplication_quota;
        let value = self.pool[index].clone();
        if !keep {
            if let Some(fresh) = self.pull()? {
                self.pool[index] = fresh;
            }
        }
        Ok(Some(value))
    }

    fn reset(&mut self) -> Result<()> {
        if self.wrapper.reset_source()? {
            if self.rng.is_none() {
                let context = GeneratorContext::default();
                self.pool_size.get_or_insert(context.config().expand_pool_size.max(1));
                self.rng = Some(context.new_rng());
            }
            return Ok(());
        }
        self.pool.clear();
        self.source_depleted = false;
        Ok(())
    }

    fn close(&mut self) {
        self.pool.clear();
        self.wrapper.close_source();
    }

    fn state(&self) -> GeneratorState {
        self.wrapper.state()
    }

    fn is_parallelizable(&self) -> bool {
        self.wrapper.source_parallelizable()
    }
}
