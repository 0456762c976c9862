//! Error handling for msgboard-store
//!
//! Wraps msgboard-core ExError with store-specific helpers

use msgboard_core::errors::{ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create a serialization error from serde_json::Error
pub fn serialization_error(operation: &str, err: serde_json::Error) -> ExError {
    ExError::new(ExErrorKind::Serialization)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create a corrupt snapshot error
pub fn corrupt_data(operation: &str, reason: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::CorruptData)
        .with_op(operation.to_string())
        .with_message(reason)
}
