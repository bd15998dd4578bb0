//! Error type for the parse entry points.
//!
//! Markdown parsing itself is total: there is no "malformed document"
//! error. Only precondition violations and line source failures surface.

use thiserror::Error;

/// Errors returned by [`crate::parse`] and friends.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The pipeline has no block recognizers, so no line could ever be consumed.
    #[error("pipeline has no block recognizers")]
    NoBlockRecognizers,

    /// The line source failed while reading.
    #[error("failed to read input line: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, ParseError>;
