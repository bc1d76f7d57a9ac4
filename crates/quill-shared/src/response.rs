//! Error body returned by every failing endpoint.

use serde::{Deserialize, Serialize};

/// One rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDetail {
    pub field: String,
    pub message: String,
}

/// Stable failure shape: `{error, message}` plus optional field details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short, stable summary of the failure kind.
    pub error: String,

    /// Human-readable explanation of this occurrence.
    pub message: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<FieldDetail>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn with_details(mut self, details: Vec<FieldDetail>) -> Self {
        self.details = details;
        self
    }

    // Common error constructors
    pub fn validation(details: Vec<FieldDetail>) -> Self {
        Self::new("Validation failed", "One or more fields are invalid").with_details(details)
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new("Unauthenticated", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new("Access denied", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("Not found", message)
    }

    pub fn internal_error() -> Self {
        Self::new("Internal error", "An unexpected error occurred")
    }
}
