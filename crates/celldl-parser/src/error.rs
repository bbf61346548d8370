//! Error and diagnostic system for the CellDL parser.
//!
//! This module provides an error handling system with:
//! - Error codes for documentation and searchability
//! - Multiple labeled spans for rich error context
//! - A snapshot of the element being processed when the error occurred
//! - Diagnostic collector for accumulating multiple errors
//!
//! # Overview
//!
//! The error system is built around the [`Diagnostic`] type, which represents
//! a single error or warning message with optional error code, multiple source
//! locations, and help text. Multiple diagnostics are wrapped in [`ParseError`]
//! for returning from [`parse`](crate::parse).
//!
//! # Example
//!
//! ```
//! # use celldl_parser::error::{Diagnostic, ErrorCode, ErrorKind};
//! # use celldl_parser::Span;
//!
//! let span = Span::new(100..120);
//! let first_span = Span::new(50..70);
//!
//! let diag = Diagnostic::error("id `q1` is defined multiple times")
//!     .with_code(ErrorCode::E204)
//!     .with_label(span, "duplicate id")
//!     .with_secondary_label(first_span, "first defined here")
//!     .with_help("element ids must be unique across the diagram");
//!
//! assert_eq!(diag.kind(), Some(ErrorKind::Structural));
//! ```

mod collector;
mod context;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub(crate) use collector::DiagnosticCollector;
pub(crate) use parse_error::Result;

pub use context::ElementContext;
pub use diagnostic::Diagnostic;
pub use error_code::{ErrorCode, ErrorKind};
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;
