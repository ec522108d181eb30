//! # Error Types
//!
//! Domain error types for folio-core.
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impls)
//! 2. Include context in error messages (field names, limits)
//! 3. Errors are enum variants, never bare Strings
//!
//! Business-rule errors that need I/O to detect (insufficient stock,
//! missing customer, illegal status transition) live in `folio-billing`;
//! this crate only knows about input validation.

use thiserror::Error;

/// Input validation errors.
///
/// Raised before any side effect: a draft that fails validation must
/// leave the system completely untouched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Collection is empty where at least one element is required.
    #[error("at least one {field} is required")]
    Empty { field: String },

    /// Collection exceeded its allowed size.
    #[error("{field} cannot have more than {max} entries")]
    TooMany { field: String, max: usize },

    /// Invalid format (e.g. malformed UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must be positive");

        let err = ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: 10_000,
        };
        assert_eq!(err.to_string(), "discount must be between 0 and 10000");
    }
}
