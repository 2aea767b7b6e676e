//! Error handling module for the permissions console.
//!
//! Absence (no configuration for a product, unknown group id) is not an error here;
//! it is reported through `Option` or a `false` "not applied" result. Errors are
//! reserved for rejected input and for snapshot I/O.

use serde::{Deserialize, Serialize};

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const IO_ERROR: &str = "IO_ERROR";
    pub const SERIALIZATION_ERROR: &str = "SERIALIZATION_ERROR";
}

/// Console error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleError {
    /// Target missing and the configured policy asks for a hard failure
    NotFound(String),
    /// Input rejected at the mutation boundary
    Validation(String),
    /// Snapshot file could not be read
    Io(String),
    /// Snapshot JSON could not be parsed or produced
    Serialization(String),
}

/// Result alias used across the crate.
pub type ConsoleResult<T> = Result<T, ConsoleError>;

impl ConsoleError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            ConsoleError::NotFound(_) => codes::NOT_FOUND,
            ConsoleError::Validation(_) => codes::VALIDATION_ERROR,
            ConsoleError::Io(_) => codes::IO_ERROR,
            ConsoleError::Serialization(_) => codes::SERIALIZATION_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            ConsoleError::NotFound(msg) => msg.clone(),
            ConsoleError::Validation(msg) => msg.clone(),
            ConsoleError::Io(msg) => msg.clone(),
            ConsoleError::Serialization(msg) => msg.clone(),
        }
    }

    /// Serializable form handed to the presentation layer.
    pub fn details(&self) -> ErrorDetails {
        ErrorDetails {
            code: self.error_code().to_string(),
            message: self.message(),
        }
    }
}

impl std::fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for ConsoleError {}

impl From<std::io::Error> for ConsoleError {
    fn from(err: std::io::Error) -> Self {
        tracing::error!("I/O error: {:?}", err);
        ConsoleError::Io(format!("I/O error: {}", err))
    }
}

impl From<serde_json::Error> for ConsoleError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        ConsoleError::Serialization(format!("JSON error: {}", err))
    }
}

/// Error details as shown to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_code() {
        let err = ConsoleError::Validation("Group name is required".to_string());
        assert_eq!(err.to_string(), "VALIDATION_ERROR: Group name is required");
    }

    #[test]
    fn test_json_error_maps_to_serialization() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ConsoleError = parse_err.into();
        assert_eq!(err.error_code(), codes::SERIALIZATION_ERROR);
        assert!(err.message().starts_with("JSON error"));
    }

    #[test]
    fn test_details_serialize() {
        let details = ConsoleError::NotFound("Member m1 not found".to_string()).details();
        let value = serde_json::to_value(&details).unwrap();
        assert_eq!(value["code"], "NOT_FOUND");
        assert_eq!(value["message"], "Member m1 not found");
    }
}
