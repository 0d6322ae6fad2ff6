//! # Error Types
//!
//! Structured error types for lasercalc_core. A failed calculation is a value,
//! not a crash: every variant serializes to JSON so a caller (CLI, web handler,
//! LLM tool) can report it without string parsing.
//!
//! ## Example
//!
//! ```rust
//! use lasercalc_core::errors::{CalcError, CalcResult};
//!
//! fn validate_thickness(thickness_mm: f64) -> CalcResult<()> {
//!     if !(thickness_mm > 0.0) {
//!         return Err(CalcError::InvalidInput {
//!             field: "thickness_mm".to_string(),
//!             value: thickness_mm.to_string(),
//!             reason: "Thickness must be positive".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for lasercalc_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for calculation operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is invalid (out of range, not finite, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Material key not recognized
    #[error("Material not found: {material_name}")]
    MaterialNotFound { material_name: String },

    /// A reference table has no entry for the requested combination
    #[error("Unsupported combination in {table}: {key}")]
    UnsupportedCombination { table: String, key: String },

    /// A formula would divide by zero (or by a non-positive quantity)
    #[error("Division by zero: {quantity} - {reason}")]
    DivisionByZero { quantity: String, reason: String },

    /// Calculation failed for a domain reason
    #[error("Calculation failed: {calculation_type} - {reason}")]
    CalculationFailed {
        calculation_type: String,
        reason: String,
    },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// File is locked by another user/process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
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

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        CalcError::MissingField {
            field: field.into(),
        }
    }

    /// Create a MaterialNotFound error
    pub fn material_not_found(material_name: impl Into<String>) -> Self {
        CalcError::MaterialNotFound {
            material_name: material_name.into(),
        }
    }

    /// Create an UnsupportedCombination error
    pub fn unsupported(table: impl Into<String>, key: impl Into<String>) -> Self {
        CalcError::UnsupportedCombination {
            table: table.into(),
            key: key.into(),
        }
    }

    /// Create a DivisionByZero error
    pub fn division_by_zero(quantity: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::DivisionByZero {
            quantity: quantity.into(),
            reason: reason.into(),
        }
    }

    /// Create a CalculationFailed error
    pub fn calculation_failed(calculation_type: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::CalculationFailed {
            calculation_type: calculation_type.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(path: impl Into<String>, locked_by: impl Into<String>, locked_at: impl Into<String>) -> Self {
        CalcError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CalcError::FileLocked { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::MissingField { .. } => "MISSING_FIELD",
            CalcError::MaterialNotFound { .. } => "MATERIAL_NOT_FOUND",
            CalcError::UnsupportedCombination { .. } => "UNSUPPORTED_COMBINATION",
            CalcError::DivisionByZero { .. } => "DIVISION_BY_ZERO",
            CalcError::CalculationFailed { .. } => "CALCULATION_FAILED",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::FileLocked { .. } => "FILE_LOCKED",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }
}

/// Reject NaN/infinite values and values below `min`.
///
/// Shared by the `validate()` methods of every calculator input.
pub(crate) fn ensure_at_least(field: &str, value: f64, min: f64) -> CalcResult<()> {
    if !value.is_finite() {
        return Err(CalcError::invalid_input(field, value.to_string(), "Value must be a finite number"));
    }
    if value < min {
        return Err(CalcError::invalid_input(
            field,
            value.to_string(),
            format!("Value must be at least {}", min),
        ));
    }
    Ok(())
}

/// Reject non-finite or non-positive values.
pub(crate) fn ensure_positive(field: &str, value: f64) -> CalcResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(CalcError::invalid_input(field, value.to_string(), "Value must be positive"));
    }
    Ok(())
}

/// Reject values outside `[min, max]`.
pub(crate) fn ensure_range(field: &str, value: f64, min: f64, max: f64) -> CalcResult<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(CalcError::invalid_input(
            field,
            value.to_string(),
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CalcError::invalid_input("thickness_mm", "-5", "Thickness must be positive");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"InvalidInput\""));
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CalcError::missing_field("test").error_code(), "MISSING_FIELD");
        assert_eq!(CalcError::material_not_found("titanium").error_code(), "MATERIAL_NOT_FOUND");
        assert_eq!(
            CalcError::division_by_zero("allocation basis", "sums to zero").error_code(),
            "DIVISION_BY_ZERO"
        );
        assert_eq!(CalcError::unsupported("kerf", "x").error_code(), "UNSUPPORTED_COMBINATION");
    }

    #[test]
    fn test_only_lock_is_recoverable() {
        assert!(CalcError::file_locked("a.lcw", "bob", "now").is_recoverable());
        assert!(!CalcError::division_by_zero("margin", "100%").is_recoverable());
    }

    #[test]
    fn test_range_guards() {
        assert!(ensure_positive("x", 1.0).is_ok());
        assert!(ensure_positive("x", 0.0).is_err());
        assert!(ensure_positive("x", f64::NAN).is_err());
        assert!(ensure_at_least("x", 0.0, 0.0).is_ok());
        assert!(ensure_at_least("x", f64::INFINITY, 0.0).is_err());
        assert!(ensure_range("x", 100.0, 0.0, 99.0).is_err());
        assert!(ensure_range("x", 50.0, 0.0, 99.0).is_ok());
    }
}
