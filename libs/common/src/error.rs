//! Custom error types for the common library
//!
//! This module defines the errors raised while talking to the remote storage
//! API, already normalized so that callers never have to parse remote error
//! schemas themselves.

use thiserror::Error;

/// Custom error type for remote storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// No API key is configured for the remote storage service
    #[error("Remote storage API key not configured")]
    NotConfigured,

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// A configured endpoint is not a valid URL
    #[error("Invalid remote storage URL: {0}")]
    InvalidUrl(String),

    /// The remote service could not be reached
    #[error("Remote storage transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The remote service answered with a non-2xx status
    #[error("{message}")]
    Upstream {
        /// Status code returned by the remote service
        status: u16,
        /// Message extracted from the remote error body, or synthesized
        message: String,
    },

    /// The remote service answered 2xx with a body that could not be decoded
    #[error("Invalid response from remote storage: {0}")]
    InvalidResponse(String),
}

impl StorageError {
    /// Build an upstream error from a remote status and its (possibly empty) error body.
    ///
    /// The remote `message` (or `error`) string wins; otherwise the message is
    /// synthesized as `"{context}: {status} {reason}"`.
    pub fn upstream(
        status: reqwest::StatusCode,
        body: &serde_json::Value,
        context: &str,
    ) -> Self {
        let message = ["message", "error"]
            .iter()
            .filter_map(|field| body.get(*field).and_then(|v| v.as_str()))
            .find(|msg| !msg.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| {
                format!(
                    "{}: {} {}",
                    context,
                    status.as_u16(),
                    status.canonical_reason().unwrap_or_default()
                )
            });

        StorageError::Upstream {
            status: status.as_u16(),
            message,
        }
    }
}

/// Type alias for Result with StorageError
pub type StorageResult<T> = Result<T, StorageError>;
