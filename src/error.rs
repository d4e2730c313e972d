//! Unified error handling for the meguri crate
//!
//! Per-page and per-item failures are contained by the components that hit
//! them (a failed page ends the crawl with a partial catalog, a failed item
//! leaves its field empty); only configuration-level problems propagate to
//! the caller.

use std::io;
use thiserror::Error;

/// Errors that can occur during HTTP fetching operations
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error (DNS, TLS, connection reset). No status code:
    /// "could not ask" as opposed to "server said no".
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Server answered with a non-2xx status other than 404
    #[error("Server error: {0}")]
    Status(u16),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Status code the server answered with, if it answered at all
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status(code) => Some(*code),
            _ => None,
        }
    }
}

/// Errors that can occur while extracting values from page content
///
/// These are normally carried as values inside a [`crate::enrich::Resolution`]
/// rather than raised: a page without the expected element is an expected
/// outcome, not a hard failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Expected element not present in the page
    #[error("Element not found in page")]
    ElementNotFound,

    /// More than one candidate value where exactly one was required
    #[error("Ambiguous value: {0} candidates")]
    Ambiguous(usize),
}

/// Unified error type for the meguri crate
#[derive(Error, Debug)]
pub enum Error {
    /// Fetch-specific errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Parse-specific errors
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other {
            context: context.into(),
            source: None,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
