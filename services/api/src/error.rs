//! Custom error types for the proxy service

use axum::{
    Json,
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::{StorageError, models::ErrorBody};
use thiserror::Error;
use tracing::error;

/// Custom error type for the proxy service
#[derive(Error, Debug)]
pub enum ApiError {
    /// The route exists but not for this HTTP method
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// The multipart body had no `file` part
    #[error("No file uploaded")]
    MissingFile,

    /// The multipart body had more than one `file` part
    #[error("Only one file may be uploaded per request")]
    TooManyFiles,

    /// Bad request with message
    #[error("{0}")]
    BadRequest(String),

    /// The request is not a multipart form
    #[error("Invalid multipart request")]
    NotMultipart(#[from] MultipartRejection),

    /// The multipart body could not be parsed
    #[error("Invalid multipart body: {0}")]
    Multipart(#[from] MultipartError),

    /// Spooling the upload to disk failed
    #[error("Failed to process upload: {0}")]
    Io(#[from] std::io::Error),

    /// The remote storage call failed; `fallback` is the generic message
    /// shown when the failure carries no caller-facing text
    #[error("{fallback}: {source}")]
    Storage {
        #[source]
        source: StorageError,
        fallback: &'static str,
    },
}

impl ApiError {
    pub fn upload(source: StorageError) -> Self {
        ApiError::Storage {
            source,
            fallback: "Failed to upload file",
        }
    }

    pub fn listing(source: StorageError) -> Self {
        ApiError::Storage {
            source,
            fallback: "Failed to retrieve media",
        }
    }

    fn status_and_body(&self) -> (StatusCode, ErrorBody) {
        match self {
            ApiError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                ErrorBody::new("Method not allowed"),
            ),
            ApiError::MissingFile | ApiError::TooManyFiles | ApiError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, ErrorBody::new(self.to_string()))
            }
            ApiError::NotMultipart(e) => (
                e.status(),
                ErrorBody::new(self.to_string()).with_details(e.body_text()),
            ),
            ApiError::Multipart(e) => (e.status(), ErrorBody::new(e.body_text())),
            ApiError::Io(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::new("Failed to upload file").with_details(e.to_string()),
            ),
            ApiError::Storage { source, fallback } => match source {
                StorageError::NotConfigured => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new(source.to_string()),
                ),
                StorageError::Upstream { status, message } => (
                    StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                    ErrorBody::new(message.clone()),
                ),
                StorageError::InvalidResponse(_) => {
                    (StatusCode::BAD_GATEWAY, ErrorBody::new(source.to_string()))
                }
                StorageError::Transport(_)
                | StorageError::Config(_)
                | StorageError::InvalidUrl(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new(*fallback).with_details(source.to_string()),
                ),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();

        if status.is_server_error() {
            error!("Request failed with {}: {}", status.as_u16(), self);
        }

        (status, Json(body)).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
