//! Error types module
//!
//! All server-side failures are unified under `AppError`. Each variant
//! self-describes its HTTP status, machine-readable code and log level through
//! `ErrorMetadata`, so the API layer can render every failure the same way.

use crate::models::{DimensionError, KeyError};
use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for bad client data such as undecodable images
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "SOURCE_NOT_FOUND")
    fn error_code(&self) -> &'static str;

    /// Whether retrying the same request may succeed
    fn is_recoverable(&self) -> bool;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Upload URL issuance failed: {0}")]
    Issuance(String),

    #[error("Source object not found: {0}")]
    SourceNotFound(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Upload rejected: {0}")]
    UploadRejected(String),

    #[error("Source object too large: {0}")]
    PayloadTooLarge(String),

    #[error("Image decode failed: {0}")]
    Decode(String),

    #[error("Image encode failed: {0}")]
    Encode(String),

    #[error("Failed to write resized image: {0}")]
    Write(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<DimensionError> for AppError {
    fn from(err: DimensionError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

impl From<KeyError> for AppError {
    fn from(err: KeyError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, sensitive, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, bool, LogLevel) {
    match err {
        AppError::InvalidInput(_) => (400, "INVALID_INPUT", false, false, LogLevel::Debug),
        AppError::Issuance(_) => (500, "ISSUANCE_ERROR", true, true, LogLevel::Error),
        AppError::SourceNotFound(_) => (404, "SOURCE_NOT_FOUND", false, false, LogLevel::Debug),
        AppError::NotFound(_) => (404, "NOT_FOUND", false, false, LogLevel::Debug),
        AppError::UploadRejected(_) => (403, "UPLOAD_REJECTED", false, false, LogLevel::Warn),
        AppError::PayloadTooLarge(_) => (413, "PAYLOAD_TOO_LARGE", false, false, LogLevel::Debug),
        AppError::Decode(_) => (422, "DECODE_ERROR", false, false, LogLevel::Warn),
        AppError::Encode(_) => (500, "ENCODE_ERROR", false, true, LogLevel::Error),
        AppError::Write(_) => (502, "WRITE_ERROR", true, true, LogLevel::Error),
        AppError::Storage(_) => (502, "STORAGE_ERROR", true, true, LogLevel::Error),
        AppError::Internal(_) => (500, "INTERNAL_ERROR", true, true, LogLevel::Error),
        AppError::InternalWithSource { .. } => {
            (500, "INTERNAL_ERROR", true, true, LogLevel::Error)
        }
    }
}

impl AppError {
    /// Get the error type name for logs
    pub fn error_type(&self) -> &str {
        match self {
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::Issuance(_) => "Issuance",
            AppError::SourceNotFound(_) => "SourceNotFound",
            AppError::NotFound(_) => "NotFound",
            AppError::UploadRejected(_) => "UploadRejected",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Decode(_) => "Decode",
            AppError::Encode(_) => "Encode",
            AppError::Write(_) => "Write",
            AppError::Storage(_) => "Storage",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).3
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).4
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::Issuance(_) => "Failed to issue upload URL".to_string(),
            AppError::SourceNotFound(ref key) => format!("Source object not found: {}", key),
            AppError::NotFound(ref key) => format!("Object not found: {}", key),
            AppError::UploadRejected(ref msg) => format!("Upload rejected: {}", msg),
            AppError::PayloadTooLarge(ref msg) => format!("Source object too large: {}", msg),
            AppError::Decode(ref msg) => format!("Could not decode image: {}", msg),
            AppError::Encode(_) => "Failed to encode resized image".to_string(),
            AppError::Write(_) => "Failed to write resized image".to_string(),
            AppError::Storage(_) => "Failed to access storage".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_source_not_found() {
        let err = AppError::SourceNotFound("cat.png".to_string());
        assert_eq!(err.http_status_code(), 404);
        assert_eq!(err.error_code(), "SOURCE_NOT_FOUND");
        assert!(!err.is_recoverable());
        assert_eq!(err.client_message(), "Source object not found: cat.png");
        assert!(!err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_error_metadata_write_is_sensitive() {
        let err = AppError::Write("connection reset by peer".to_string());
        assert_eq!(err.http_status_code(), 502);
        assert!(err.is_recoverable());
        assert!(err.is_sensitive());
        assert!(!err.client_message().contains("connection reset"));
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_every_failure_is_non_success() {
        let errors = [
            AppError::InvalidInput("x".into()),
            AppError::Issuance("x".into()),
            AppError::SourceNotFound("x".into()),
            AppError::NotFound("x".into()),
            AppError::UploadRejected("x".into()),
            AppError::PayloadTooLarge("x".into()),
            AppError::Decode("x".into()),
            AppError::Encode("x".into()),
            AppError::Write("x".into()),
            AppError::Storage("x".into()),
            AppError::Internal("x".into()),
        ];
        for err in errors {
            assert!(err.http_status_code() >= 400, "{:?}", err);
        }
    }

    #[test]
    fn test_dimension_error_becomes_invalid_input() {
        let err: AppError = DimensionError::Missing("width").into();
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.client_message(), "Please enter a width");
    }

    #[test]
    fn test_detailed_message_includes_chain() {
        let err = AppError::from(anyhow::anyhow!("root cause").context("outer"));
        let details = err.detailed_message();
        assert!(details.contains("Internal error with source"));
        assert!(details.contains("outer"));
    }
}
