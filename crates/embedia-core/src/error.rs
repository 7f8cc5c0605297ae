//! Error types module
//!
//! This module provides the core error types used throughout the Embedia
//! application. All errors are unified under the `AppError` enum, and the
//! `ErrorMetadata` trait maps each variant to its HTTP response
//! characteristics.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for client-correctable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "STORAGE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("File is too big: {0}")]
    SizeExceeded(String),

    #[error("No file inputs were submitted")]
    NoFilesSubmitted,

    #[error("Multipart parse error: {0}")]
    Multipart(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Static metadata per variant: (http_status, error_code, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, LogLevel) {
    match err {
        AppError::SizeExceeded(_) => (413, "PAYLOAD_TOO_LARGE", LogLevel::Debug),
        // Historical behavior: missing file inputs surface as a server error, not a 400.
        AppError::NoFilesSubmitted => (500, "NO_FILE_INPUTS", LogLevel::Warn),
        AppError::Multipart(_) => (500, "MULTIPART_PARSE_ERROR", LogLevel::Warn),
        AppError::Storage(_) => (500, "STORAGE_ERROR", LogLevel::Error),
        AppError::InvalidInput(_) => (400, "INVALID_INPUT", LogLevel::Debug),
        AppError::Internal(_) => (500, "INTERNAL_ERROR", LogLevel::Error),
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).2
    }

    fn client_message(&self) -> String {
        match self {
            AppError::SizeExceeded(_) => "File is too big".to_string(),
            AppError::NoFilesSubmitted => "No file inputs were submitted".to_string(),
            AppError::Multipart(ref msg) => format!("Failed to parse upload: {}", msg),
            // Surface the collaborator's message so callers can see why the store failed.
            AppError::Storage(ref msg) => msg.clone(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_size_exceeded() {
        let err = AppError::SizeExceeded("20971520 bytes exceeds maximum".to_string());
        assert_eq!(err.http_status_code(), 413);
        assert_eq!(err.error_code(), "PAYLOAD_TOO_LARGE");
        assert_eq!(err.client_message(), "File is too big");
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_error_metadata_no_files_submitted() {
        let err = AppError::NoFilesSubmitted;
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "NO_FILE_INPUTS");
        assert_eq!(err.client_message(), "No file inputs were submitted");
        assert_eq!(err.log_level(), LogLevel::Warn);
    }

    #[test]
    fn test_error_metadata_storage_message_surfaced() {
        let err = AppError::Storage("Upload failed: disk full".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "STORAGE_ERROR");
        assert_eq!(err.client_message(), "Upload failed: disk full");
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_error_metadata_internal_hides_details() {
        let err = AppError::from(io::Error::new(io::ErrorKind::Other, "spool write failed"));
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.client_message(), "Internal server error");
        assert!(err.to_string().contains("spool write failed"));
    }
}
