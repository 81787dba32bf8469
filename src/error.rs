//! Error types for the htmldiff-tokens library.
//!
//! All fallible operations return [`HtmlDiffError`] through the crate-wide
//! [`Result`] alias. Every error is fatal for the diff session that raised
//! it: tokenization is deterministic, so retrying with the same inputs
//! fails the same way.
//!
//! # Examples
//!
//! ```
//! use htmldiff_tokens::error::{HtmlDiffError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(HtmlDiffError::configuration("match threshold out of range"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for htmldiff-tokens operations.
#[derive(Error, Debug)]
pub enum HtmlDiffError {
    /// Input is not valid for the configured text encoding.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// The sanitizer pre-pass failed; tokenization never runs afterwards.
    #[error("Sanitization error: {0}")]
    Sanitization(String),

    /// Rejected configuration, reported before any tokenization.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A cache provider refused to store a result.
    #[error("Cache error: {0}")]
    Cache(String),

    /// I/O errors (reading inputs, config files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with HtmlDiffError.
pub type Result<T> = std::result::Result<T, HtmlDiffError>;

impl HtmlDiffError {
    /// Create a new encoding error.
    pub fn encoding<S: Into<String>>(msg: S) -> Self {
        HtmlDiffError::Encoding(msg.into())
    }

    /// Create a new sanitization error.
    pub fn sanitization<S: Into<String>>(msg: S) -> Self {
        HtmlDiffError::Sanitization(msg.into())
    }

    /// Create a new configuration error.
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        HtmlDiffError::Configuration(msg.into())
    }

    /// Create a new cache error.
    pub fn cache<S: Into<String>>(msg: S) -> Self {
        HtmlDiffError::Cache(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        HtmlDiffError::Other(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        HtmlDiffError::Other(format!("Invalid argument: {}", msg.into()))
    }
}
