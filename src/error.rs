//! Error types for the calculator engine.
//!
//! Every failure the engine can produce is one of three recoverable kinds:
//! validation problems (bad operand input or a domain violation of a specific
//! operation), operation problems (structural misuse or an I/O fault during
//! save/load), and unknown-operation lookups in the factory. Nothing here is
//! fatal to the process; the embedding layer is expected to catch and report.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type CalcResult<T> = Result<T, CalcError>;

/// Errors raised by operations, the history engine, and persistence.
#[derive(Debug, Error)]
pub enum CalcError {
    /// Malformed operand input or a domain violation of a specific operation
    /// (division by zero, negative root, ...). Always recoverable by
    /// re-prompting; engine state is never mutated when this is raised.
    #[error("{0}")]
    Validation(String),

    /// Structural misuse (no operation bound) or an I/O / serialization
    /// failure during save or load. Engine state is unchanged on failure.
    #[error("{message}")]
    Operation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Requested operation name is not registered with the factory.
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),
}

impl CalcError {
    /// Build a validation error from any message.
    pub fn validation(message: impl Into<String>) -> Self {
        CalcError::Validation(message.into())
    }

    /// Build an operation error with no underlying cause.
    pub fn operation(message: impl Into<String>) -> Self {
        CalcError::Operation {
            message: message.into(),
            source: None,
        }
    }

    /// Build an operation error wrapping the fault that caused it.
    pub fn operation_with(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        CalcError::Operation {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// True when this is the validation kind.
    pub fn is_validation(&self) -> bool {
        matches!(self, CalcError::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = CalcError::validation("Division by zero is not allowed");
        assert_eq!(err.to_string(), "Division by zero is not allowed");

        let err = CalcError::operation("No operation set");
        assert_eq!(err.to_string(), "No operation set");

        let err = CalcError::UnknownOperation("invalid_op".to_string());
        assert_eq!(err.to_string(), "Unknown operation: invalid_op");
    }

    #[test]
    fn test_operation_error_preserves_source() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = CalcError::operation_with("Failed to save history", io);
        assert_eq!(err.to_string(), "Failed to save history");
        assert!(std::error::Error::source(&err).is_some());
    }
}
