//! Field-level validation primitives
//!
//! Request payloads are validated by pure functions returning a
//! [`ValidationResult`]; nothing here is tied to any particular form or UI
//! binding. Domains build their own validators on top of these types and
//! refuse to send a request the backend would reject.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field name as the caller knows it (e.g., "monto", "motivo")
    pub field: String,
    /// Human-readable message
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of validating a request payload
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    errors: Vec<FieldError>,
}

impl ValidationResult {
    /// Creates a successful validation result
    pub fn ok() -> Self {
        Self::default()
    }

    /// Creates a failed validation result with errors
    pub fn fail(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    /// Whether validation passed
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// The collected errors
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Adds an error to the result
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Merges another validation result into this one
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
    }

    /// Converts into `Ok(value)` when valid, `Err(errors)` otherwise
    pub fn into_result<T>(self, value: T) -> Result<T, Vec<FieldError>> {
        if self.is_valid() {
            Ok(value)
        } else {
            Err(self.errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_result() {
        let result = ValidationResult::ok();
        assert!(result.is_valid());
        assert_eq!(result.into_result(42), Ok(42));
    }

    #[test]
    fn test_accumulates_errors() {
        let mut result = ValidationResult::ok();
        result.add_error("monto", "must be greater than zero");
        result.add_error("concepto", "must not be blank");

        assert!(!result.is_valid());
        assert_eq!(result.errors().len(), 2);
        assert_eq!(result.errors()[0].field, "monto");
    }

    #[test]
    fn test_merge() {
        let mut a = ValidationResult::ok();
        let mut b = ValidationResult::ok();
        b.add_error("motivo", "must not be blank");
        a.merge(b);

        assert!(!a.is_valid());
        let errs = a.into_result(()).unwrap_err();
        assert_eq!(errs[0].to_string(), "motivo: must not be blank");
    }
}
