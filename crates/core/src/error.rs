//! Error types for Claritas operations.
//!
//! This module defines the main error type [`ClaritasError`] which represents
//! all possible errors that can occur during content location, fetching,
//! and parsing. Only [`ClaritasError::NoContent`] is a hard pipeline
//! failure: rewrite-backend problems degrade to the heuristic fallback and
//! confidence-analysis problems degrade to a default report, so neither
//! appears here.
//!
//! # Example
//!
//! ```rust
//! use claritas_core::{ClaritasError, Result};
//!
//! fn locate_region(html: &str) -> Result<String> {
//!     if html.is_empty() {
//!         return Err(ClaritasError::NoContent);
//!     }
//!     // ... location logic
//!     # Ok(String::new())
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the simplification pipeline.
#[derive(Error, Debug)]
pub enum ClaritasError {
    /// HTTP request errors from reqwest.
    #[cfg(feature = "fetch")]
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request timeout.
    ///
    /// Returned when an HTTP request exceeds the configured timeout duration.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTML parsing errors.
    ///
    /// Returned when HTML cannot be parsed, often due to malformed markup
    /// or invalid CSS selectors.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// No content region could be located in the document.
    ///
    /// Returned when no candidate element reaches a positive content score.
    /// This typically happens on navigation pages, search results, or pages
    /// with very little text. A simplify request must not proceed past it.
    #[error("No main content found")]
    NoContent,

    /// Persisted-state document problems.
    ///
    /// Returned when the state file exists but cannot be parsed or written.
    #[error("State error: {0}")]
    StateError(String),

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// File read/write errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClaritasError {
    /// Maps an error onto the human-readable message shown to end users.
    ///
    /// A small set of recognized failures get specific friendly text;
    /// anything else collapses into a generic retry message, because the
    /// product surface never exposes raw error chains.
    pub fn friendly_message(&self) -> &'static str {
        match self {
            ClaritasError::NoContent => "No content found to simplify on this page",
            #[cfg(feature = "fetch")]
            ClaritasError::HttpError(e) if e.is_connect() => {
                "Could not reach the page, check your connection"
            }
            ClaritasError::Timeout { .. } => "Processing took too long, please try again",
            _ => "Simplification failed, please try again",
        }
    }
}

/// Result type alias for ClaritasError.
pub type Result<T> = std::result::Result<T, ClaritasError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClaritasError::InvalidUrl("not a url".to_string());
        assert!(err.to_string().contains("Invalid URL"));
    }

    #[test]
    fn test_no_content_message() {
        let err = ClaritasError::NoContent;
        assert_eq!(err.to_string(), "No main content found");
        assert_eq!(err.friendly_message(), "No content found to simplify on this page");
    }

    #[test]
    fn test_timeout_error() {
        let err = ClaritasError::Timeout { timeout: 30 };
        assert!(err.to_string().contains("30"));
        assert_eq!(err.friendly_message(), "Processing took too long, please try again");
    }

    #[test]
    fn test_generic_friendly_message() {
        let err = ClaritasError::HtmlParseError("bad selector".to_string());
        assert_eq!(err.friendly_message(), "Simplification failed, please try again");
    }
}
