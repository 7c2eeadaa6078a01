//! Error types for data validation

use thiserror::Error;

/// Result type for model operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors raised when a data object violates its invariants
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Inconsistent or insufficient input data
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },
}

impl ModelError {
    /// Create an invalid input error
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// The human-readable reason
    pub fn reason(&self) -> &str {
        match self {
            Self::InvalidInput { reason } => reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ModelError::invalid_input("rows must not be empty");
        assert_eq!(err.to_string(), "Invalid input: rows must not be empty");
        assert_eq!(err.reason(), "rows must not be empty");
    }
}
