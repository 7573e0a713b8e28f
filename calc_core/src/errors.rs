//! # Error Types
//!
//! Structured error types for calc_core. Every calculator returns a
//! [`CalcResult`]; nothing in this crate panics on bad user input. The
//! presentation layer decides whether an error becomes an inline message,
//! a toast, or a JSON payload.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::errors::{CalcError, CalcResult};
//!
//! fn validate_amount(amount: f64) -> CalcResult<()> {
//!     if !amount.is_finite() {
//!         return Err(CalcError::invalid_input(
//!             "amount",
//!             amount.to_string(),
//!             "Amount must be a finite number",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for calc_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for calculator operations.
///
/// Each variant carries enough context to render a useful message or to be
/// handled programmatically via [`CalcError::error_code`].
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is invalid (non-numeric, non-finite, out of range)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// Unit (or currency) symbol not present in the table being used
    #[error("Unknown unit '{symbol}' in {domain} table")]
    UnknownUnit { symbol: String, domain: String },

    /// Arithmetic expression is malformed or evaluates to a non-finite number
    #[error("Cannot evaluate '{expression}': {reason}")]
    EvaluationError { expression: String, reason: String },

    /// Input lies outside the mathematical domain of the operation
    #[error("Domain error in {operation}({value}): {reason}")]
    DomainError {
        operation: String,
        value: String,
        reason: String,
    },

    /// Conversion could not produce a finite value (e.g. zero factor)
    #[error("Conversion failed: {reason}")]
    ConversionFailed { reason: String },

    /// Favorites id does not match any calculator in the catalog
    #[error("Unknown calculator: {path}")]
    UnknownCalculator { path: String },

    /// Backing store I/O error
    #[error("Storage error: {operation} on '{key}' - {reason}")]
    StorageError {
        operation: String,
        key: String,
        reason: String,
    },

    /// Store is locked by another process
    #[error("Store locked: '{path}' is locked by {locked_by} since {locked_at}")]
    StoreLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON/TOML serialization or deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Persisted document written by an incompatible schema version
    #[error("Version mismatch: stored version {stored_version}, expected {expected_version}")]
    VersionMismatch {
        stored_version: String,
        expected_version: String,
    },
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an UnknownUnit error
    pub fn unknown_unit(symbol: impl Into<String>, domain: impl Into<String>) -> Self {
        CalcError::UnknownUnit {
            symbol: symbol.into(),
            domain: domain.into(),
        }
    }

    /// Create an EvaluationError
    pub fn evaluation(expression: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::EvaluationError {
            expression: expression.into(),
            reason: reason.into(),
        }
    }

    /// Create a DomainError
    pub fn domain(operation: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::DomainError {
            operation: operation.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a ConversionFailed error
    pub fn conversion_failed(reason: impl Into<String>) -> Self {
        CalcError::ConversionFailed {
            reason: reason.into(),
        }
    }

    /// Create a StorageError
    pub fn storage(operation: impl Into<String>, key: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::StorageError {
            operation: operation.into(),
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a StoreLocked error
    pub fn store_locked(path: impl Into<String>, locked_by: impl Into<String>, locked_at: impl Into<String>) -> Self {
        CalcError::StoreLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Create a SerializationError from any displayable error
    pub fn serialization(reason: impl std::fmt::Display) -> Self {
        CalcError::SerializationError {
            reason: reason.to_string(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CalcError::StoreLocked { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::UnknownUnit { .. } => "UNKNOWN_UNIT",
            CalcError::EvaluationError { .. } => "EVALUATION_ERROR",
            CalcError::DomainError { .. } => "DOMAIN_ERROR",
            CalcError::ConversionFailed { .. } => "CONVERSION_FAILED",
            CalcError::UnknownCalculator { .. } => "UNKNOWN_CALCULATOR",
            CalcError::StorageError { .. } => "STORAGE_ERROR",
            CalcError::StoreLocked { .. } => "STORE_LOCKED",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }
}

/// Reject NaN and infinities for a named input field.
pub(crate) fn require_finite(field: &str, value: f64) -> CalcResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::invalid_input(field, value.to_string(), "Must be a finite number"))
    }
}

/// Require a finite, strictly positive value.
pub(crate) fn require_positive(field: &str, value: f64) -> CalcResult<f64> {
    require_finite(field, value)?;
    if value <= 0.0 {
        return Err(CalcError::invalid_input(field, value.to_string(), "Must be greater than zero"));
    }
    Ok(value)
}

/// Require a finite, non-negative value.
pub(crate) fn require_non_negative(field: &str, value: f64) -> CalcResult<f64> {
    require_finite(field, value)?;
    if value < 0.0 {
        return Err(CalcError::invalid_input(field, value.to_string(), "Cannot be negative"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CalcError::unknown_unit("furlong", "Length");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"UnknownUnit\""));
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CalcError::evaluation("5/0", "not finite").error_code(), "EVALUATION_ERROR");
        assert_eq!(CalcError::domain("factorial", "-1", "negative").error_code(), "DOMAIN_ERROR");
        assert_eq!(CalcError::conversion_failed("zero factor").error_code(), "CONVERSION_FAILED");
    }

    #[test]
    fn test_only_lock_errors_are_recoverable() {
        assert!(CalcError::store_locked("history.json", "pid 12", "now").is_recoverable());
        assert!(!CalcError::invalid_input("amount", "NaN", "bad").is_recoverable());
    }

    #[test]
    fn test_input_guards() {
        assert!(require_finite("x", f64::NAN).is_err());
        assert!(require_finite("x", f64::INFINITY).is_err());
        assert_eq!(require_positive("x", 2.0), Ok(2.0));
        assert!(require_positive("x", 0.0).is_err());
        assert_eq!(require_non_negative("x", 0.0), Ok(0.0));
        assert!(require_non_negative("x", -0.5).is_err());
    }

    #[test]
    fn test_display_messages() {
        let err = CalcError::invalid_input("tenure", "0", "Must be greater than zero");
        assert_eq!(err.to_string(), "Invalid input for 'tenure': 0 - Must be greater than zero");
    }
}
