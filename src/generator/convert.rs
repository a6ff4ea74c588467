//! Value mapping adapters

use super::{BoxedGenerator, Generator, GeneratorContext, GeneratorState, GeneratorWrapper};
use crate::error::Result;
use crate::value::{Number, Value};

/// Decorator that converts every produced value with a plain function
pub struct MappedGenerator<S, T> {
    wrapper: GeneratorWrapper<S>,
    map: fn(S) -> T,
}

impl<S, T> MappedGenerator<S, T> {
    pub fn new(owner: &'static str, source: BoxedGenerator<S>, map: fn(S) -> T) -> Self {
        Self {
            wrapper: GeneratorWrapper::new(owner, source),
            map,
        }
    }
}

impl<S, T> Generator<T> for MappedGenerator<S, T> {
    fn init(&mut self, context: &GeneratorContext) -> Result<()> {
        self.wrapper.init_source(context)
    }

    fn generate(&mut self) -> Result<Option<T>> {
        Ok(self.wrapper.generate_from_source()?.map(self.map))
    }

    fn reset(&mut self) -> Result<()> {
        self.wrapper.reset_source().map(|_| ())
    }

    fn close(&mut self) {
        self.wrapper.close_source()
    }

    fn state(&self) -> GeneratorState {
        self.wrapper.state()
    }

    fn is_thread_safe(&self) -> bool {
        self.wrapper.source_thread_safe()
    }

    fn is_parallelizable(&self) -> bool {
        self.wrapper.source_parallelizable()
    }
}

/// Numeric generator presented as a [`Value`] generator
pub type NumberToValue = MappedGenerator<Number, Value>;

/// Wrap a numeric generator so it can feed `Distribution::apply_to`
pub fn number_to_value(source: BoxedGenerator<Number>) -> NumberToValue {
    MappedGenerator::new("NumberToValue", source, Value::from)
}

/// Present an `i64` generator as a [`Number`] generator
pub fn long_to_number(source: BoxedGenerator<i64>) -> MappedGenerator<i64, Number> {
    MappedGenerator::new("LongToNumber", source, Number::Long)
}

/// Present an `f64` generator as a [`Number`] generator
pub fn double_to_number(source: BoxedGenerator<f64>) -> MappedGenerator<f64, Number> {
    MappedGenerator::new("DoubleToNumber", source, Number::Double)
}
