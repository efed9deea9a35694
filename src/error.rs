//! Error types for filter parsing, schema handling and backend lookup.
//!
//! Validation problems found while parsing filters are never reported one at a
//! time: the parser collects every message and returns them together as
//! [`ValidationErrors`], wrapped in [`FilterqlError::Validation`].

use serde::Serialize;
use thiserror::Error;

/// The key under which validation messages are reported to callers.
pub const FILTERS_ERROR_KEY: &str = "filters";

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FilterqlError>;

/// Errors produced by filterql.
#[derive(Error, Debug)]
pub enum FilterqlError {
    /// The filters failed validation. Contains every message found.
    #[error("Invalid filters: {0}")]
    Validation(ValidationErrors),

    /// A search schema could not be built or merged.
    #[error("Schema error: {0}")]
    Schema(String),

    /// A named resource (e.g. a backend translator) does not exist.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl FilterqlError {
    pub fn schema(msg: impl Into<String>) -> Self {
        FilterqlError::Schema(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        FilterqlError::NotFound(msg.into())
    }

    /// Returns the validation messages if this is a validation error.
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            FilterqlError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for FilterqlError {
    fn from(errors: ValidationErrors) -> Self {
        FilterqlError::Validation(errors)
    }
}

/// Aggregated validation messages, in the order they were discovered.
///
/// Serializes as `{"filters": ["message", ...]}`, the payload an API layer
/// returns to the caller as the body of a 400 response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ValidationErrors {
    #[serde(rename = "filters")]
    messages: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns the `{"filters": [...]}` error dictionary.
    pub fn to_error_dict(&self) -> serde_json::Value {
        serde_json::json!({ FILTERS_ERROR_KEY: self.messages })
    }
}

impl From<Vec<String>> for ValidationErrors {
    fn from(messages: Vec<String>) -> Self {
        Self { messages }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.messages.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_dict_shape() {
        let errors = ValidationErrors::from(vec![
            "Unknown field: a".to_string(),
            "Unknown field: b".to_string(),
        ]);

        assert_eq!(
            errors.to_error_dict(),
            serde_json::json!({"filters": ["Unknown field: a", "Unknown field: b"]})
        );
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            errors.to_error_dict()
        );
    }

    #[test]
    fn test_validation_error_display() {
        let err = FilterqlError::from(ValidationErrors::from(vec![
            "Unknown field: a".to_string(),
            "Unknown field: b".to_string(),
        ]));

        assert_eq!(
            err.to_string(),
            "Invalid filters: Unknown field: a; Unknown field: b"
        );
        assert_eq!(err.validation_errors().unwrap().len(), 2);
    }

    #[test]
    fn test_non_validation_error_has_no_messages() {
        let err = FilterqlError::not_found("backend 'sphinx'");
        assert!(err.validation_errors().is_none());
        assert_eq!(err.to_string(), "Not found: backend 'sphinx'");
    }
}
