//! Error types for the bill analysis service.
//!
//! This module defines all error types used throughout the crate. Every error
//! is eventually rendered into a JSON `{"error": ...}` body at the HTTP boundary,
//! so the display strings are written for end users.

use thiserror::Error;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the service.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid request input (form fields, file type, size)
    #[error("Invalid request: {message}")]
    Validation {
        /// Detailed error message
        message: String,
        /// Form field that caused the error, if applicable
        field: Option<String>,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Detailed error message
        message: String,
        /// Configuration key that caused the error
        key: Option<String>,
    },

    /// A model response could not be turned into a usage figure
    #[error("Could not extract usage: {message}")]
    Extraction {
        /// Detailed error message
        message: String,
    },

    /// Failure talking to the external model provider
    #[error("Integration error with {service}: {message}")]
    Integration {
        /// Name of the external service
        service: String,
        /// Detailed error message
        message: String,
    },

    /// Timeout error
    #[error("Operation timed out after {duration_ms}ms: {message}")]
    Timeout {
        /// Detailed error message
        message: String,
        /// Duration in milliseconds before timeout
        duration_ms: u64,
    },

    /// No chat session exists for the user
    #[error("No active chat session for user '{user_id}'. Please upload a bill first.")]
    SessionNotFound {
        /// The user that was looked up
        user_id: String,
    },

    /// Error while staging the uploaded file
    #[error("Upload error: {message}")]
    Upload {
        /// Detailed error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error (unexpected condition)
    #[error("Internal error: {message}")]
    Internal {
        /// Detailed error message
        message: String,
    },
}

impl Error {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Create a validation error with field context.
    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: None,
        }
    }

    /// Create a configuration error for a specific key.
    pub fn config_key(message: impl Into<String>, key: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Create an extraction error.
    pub fn extraction(message: impl Into<String>) -> Self {
        Error::Extraction {
            message: message.into(),
        }
    }

    /// Create an integration error.
    pub fn integration(service: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Integration {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(message: impl Into<String>, duration_ms: u64) -> Self {
        Error::Timeout {
            message: message.into(),
            duration_ms,
        }
    }

    /// Create a session-not-found error.
    pub fn session_not_found(user_id: impl Into<String>) -> Self {
        Error::SessionNotFound {
            user_id: user_id.into(),
        }
    }

    /// Create an upload error.
    pub fn upload(message: impl Into<String>) -> Self {
        Error::Upload {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal {
            message: message.into(),
        }
    }

    /// Check if this error is recoverable.
    ///
    /// Recoverable errors are worth retrying by the caller without changing the request.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Extraction { .. } | Error::Integration { .. } | Error::Timeout { .. }
        )
    }

    /// Get the error category for metrics.
    pub fn category(&self) -> &'static str {
        match self {
            Error::Validation { .. } => "validation",
            Error::Config { .. } => "config",
            Error::Extraction { .. } => "extraction",
            Error::Integration { .. } => "integration",
            Error::Timeout { .. } => "timeout",
            Error::SessionNotFound { .. } => "session_not_found",
            Error::Upload { .. } => "upload",
            Error::Io(_) => "io",
            Error::Internal { .. } => "internal",
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::config(err.to_string())
    }
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Attach the offending form field to validation errors.
    fn with_field(self, field: impl Into<String>) -> Result<T>;
}

impl<T> ErrorContext<T> for Result<T> {
    fn with_field(self, field: impl Into<String>) -> Result<T> {
        self.map_err(|e| match e {
            Error::Validation { message, .. } => Error::Validation {
                message,
                field: Some(field.into()),
            },
            other => other,
        })
    }
}
