//! Error types for the webhook and relay paths.
//!
//! Transport-level and relay errors turn into HTTP responses. Submission
//! errors never reach the caller; they are only reported through the sink.

use std::io;
use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Request rejected before its body is looked at.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("Bad Request")]
    BadRequest,
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RequestError::BadRequest => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}

/// Problem with the content of an accepted webhook submission.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// The provider reported a failed generation.
    #[error("{0}")]
    UpstreamReportedFailure(String),

    #[error("resImage is not a file")]
    InvalidFile,

    #[error("malformed multipart body: {0}")]
    Malformed(String),

    #[error("failed to save image to {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failure while relaying a face-swap request.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("failed to read {path}: {source}")]
    LocalFileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("API key is not configured")]
    MissingCredential,

    #[error("request to face-swap API failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("face-swap API returned {status}")]
    RemoteNonSuccess { status: StatusCode, body: String },
}

impl RelayError {
    /// Status returned to the caller. Remote failures keep the provider's code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::RemoteNonSuccess { status, .. } => *status,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON body for relay failures.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: &'static str,
    pub error: String,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            Json(ErrorBody {
                status: "error",
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
