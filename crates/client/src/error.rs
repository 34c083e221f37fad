//! Error types for task API operations.
//!
//! This module defines the errors that can occur while talking to the
//! task backend, over HTTP or in memory.

use loanboard_protocol::{CardId, ProtocolError};

/// Errors that can occur during task API operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request could not be sent or its response not read.
    #[error("request to {url} failed: {source}")]
    Request {
        /// The endpoint that was called.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered with a non-success status.
    #[error("{url} returned HTTP {status}{}", format_body(.body))]
    Status {
        /// The endpoint that was called.
        url: String,
        /// The HTTP status code.
        status: u16,
        /// The response body, possibly empty.
        body: String,
    },

    /// A response body could not be decoded as a card.
    #[error("invalid response from {url}: {source}")]
    Decode {
        /// The endpoint that was called.
        url: String,
        /// The JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A task listing could not be decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// An endpoint URL could not be built.
    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// The task does not exist.
    #[error("task not found: {0}")]
    NotFound(CardId),

    /// A failure injected into the in-memory backend.
    #[error("simulated {operation} failure")]
    Simulated {
        /// The operation that was made to fail.
        operation: &'static str,
    },
}

/// Formats a response body for the status error message.
fn format_body(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        String::new()
    } else {
        format!(": {body}")
    }
}

impl Error {
    /// Returns the HTTP status code, if the backend answered with one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A specialized Result type for task API operations.
pub type Result<T> = std::result::Result<T, Error>;
