//! Error types for yqb

use thiserror::Error;

/// Result type alias for yqb operations
pub type QbResult<T> = Result<T, QbError>;

/// Error types for building, converting and running statements
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QbError {
    /// A statement is missing a required clause
    #[error("{0}")]
    Validation(String),

    /// A predicate operand cannot be used with the requested operator
    #[error("{0}")]
    InvalidOperand(String),

    /// An argument has no representation in the typed parameter tier
    #[error("unsupported type `{type_name}`: {reason}")]
    Conversion { type_name: String, reason: String },

    /// A run operation was invoked on a builder without a runner
    #[error("cannot run; no Runner set (RunWith)")]
    RunnerNotSet,

    /// The runner returned no row where one was required
    #[error("Not found: {0}")]
    NotFound(String),

    /// Error surfaced by a runner
    #[error("Runner error: {0}")]
    Runner(String),

    /// The runner gave up after the caller-supplied deadline
    #[error("Query timeout after {0:?}")]
    Timeout(std::time::Duration),
}

impl QbError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an invalid operand error
    pub fn invalid_operand(message: impl Into<String>) -> Self {
        Self::InvalidOperand(message.into())
    }

    /// Create a conversion error for the named argument type
    pub fn conversion(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Conversion {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a runner error
    pub fn runner(message: impl Into<String>) -> Self {
        Self::Runner(message.into())
    }

    /// Check if this is the "no runner" sentinel
    pub fn is_runner_not_set(&self) -> bool {
        matches!(self, Self::RunnerNotSet)
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runner_not_set_message() {
        assert_eq!(
            QbError::RunnerNotSet.to_string(),
            "cannot run; no Runner set (RunWith)"
        );
        assert!(QbError::RunnerNotSet.is_runner_not_set());
    }

    #[test]
    fn conversion_names_type() {
        let err = QbError::conversion("null", "untyped NULL has no declared type");
        assert_eq!(
            err.to_string(),
            "unsupported type `null`: untyped NULL has no declared type"
        );
    }
}
