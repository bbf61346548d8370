//! Error types for CellDL operations.
//!
//! This module provides the main error type [`CellDlError`] which wraps
//! the error conditions that can occur while loading, parsing and
//! exporting a diagram.

use std::io;

use thiserror::Error;

use celldl_parser::error::ParseError;

/// The main error type for CellDL operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant carries the diagnostics together with the text they
/// point into: the document, or a user stylesheet when that failed to parse.
/// This is what rich error reporting needs to render source snippets.
#[derive(Debug, Error)]
pub enum CellDlError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Export error: {0}")]
    Export(#[from] serde_json::Error),
}

impl CellDlError {
    /// Create a new `Parse` error with the associated source text.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
