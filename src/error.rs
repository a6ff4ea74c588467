//! Engine error taxonomy
//!
//! Every failure the engine raises falls into one of three kinds. None of them is
//! retried by the engine itself; they propagate unchanged to the caller.

/// Error type for generator and distribution operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeneratorError {
    /// Bad static parameters (bounds, granularity, unknown names, impossible uniqueness)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Lifecycle misuse or an invalid state detected during initialization
    #[error("Illegal generator state: {0}")]
    IllegalState(String),

    /// A strategy was asked for something outside its capability
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

impl GeneratorError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn illegal_state(msg: impl Into<String>) -> Self {
        Self::IllegalState(msg.into())
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }
}

/// Result type used by the engine
pub type Result<T> = std::result::Result<T, GeneratorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = GeneratorError::config("min > max");
        assert_eq!(err.to_string(), "Configuration error: min > max");

        let err = GeneratorError::illegal_state("not initialized");
        assert!(err.to_string().contains("not initialized"));

        let err = GeneratorError::unsupported("unique");
        assert!(matches!(err, GeneratorError::Unsupported(_)));
    }
}
