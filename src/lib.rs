//! datapulse - Synthetic test data generation engine
//!
//! datapulse produces realistic test data from declarative field descriptions. Every
//! value comes from a pull-based producer, and sampling strategies decide the order and
//! frequency in which values appear.
//!
//! # Architecture
//!
//! - **Producer lifecycle**: [`generator::Generator`] with init/generate/reset/close
//! - **Sampling strategies**: sequences (random, step, shuffle, wedge, ...), weight
//!   functions and cumulative distribution functions, see [`distribution`]
//! - **Composition proxies**: buffering samplers, uniqueness validation, shared access
//! - **Registry**: named strategies resolved through [`distribution::SequenceRegistry`]
//! - **Temporal producers**: day and date-time generators on top of numeric strategies
//!
//! # Example
//!
//! ```
//! use datapulse::distribution::{Distribution, SequenceRegistry};
//! use datapulse::generator::{Generator, GeneratorContext};
//! use datapulse::value::{Number, NumberSpec};
//!
//! let registry = SequenceRegistry::with_defaults();
//! let step = registry.get_registered_sequence("step", true)?.unwrap();
//! let mut gen = step.create_number_generator(NumberSpec::long(1, 9, 4), false)?;
//! gen.init(&GeneratorContext::default())?;
//! assert_eq!(gen.generate()?, Some(Number::Long(1)));
//! assert_eq!(gen.generate()?, Some(Number::Long(5)));
//! assert_eq!(gen.generate()?, Some(Number::Long(9)));
//! assert_eq!(gen.generate()?, None);
//! # Ok::<(), datapulse::GeneratorError>(())
//! ```

pub mod config;
pub mod distribution;
pub mod error;
pub mod factory;
pub mod generator;
pub mod temporal;
pub mod value;

// Re-export commonly used types
pub use config::Config;
pub use error::{GeneratorError, Result};
