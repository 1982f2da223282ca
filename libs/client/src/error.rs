//! Error types for the client components

use thiserror::Error;

/// Local constraint violation, detected before any network call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("File is too large ({} max)", human_size(*.max))]
    TooLarge { size: u64, max: u64 },

    #[error("File type not allowed: {mime}")]
    UnsupportedType { mime: String },
}

/// Errors raised by the client transport and components
#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The proxy answered with a non-2xx status
    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Failed to read file: {0}")]
    Read(#[from] std::io::Error),
}

/// Render a byte count as `10 MB`, `512 KB` or `100 B`
pub fn human_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB && bytes % MB == 0 {
        format!("{} MB", bytes / MB)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{} KB", bytes / KB)
    } else {
        format!("{} B", bytes)
    }
}
