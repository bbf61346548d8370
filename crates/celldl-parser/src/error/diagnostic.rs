//! The core diagnostic type for the CellDL error system.
//!
//! A [`Diagnostic`] represents a single error or warning with optional
//! error code, multiple labeled source spans, help text and a snapshot of
//! the element that was being processed.

use std::fmt;

use crate::{
    error::{ElementContext, ErrorKind, Severity, error_code::ErrorCode, label::Label},
    span::Span,
};

/// A rich diagnostic message with source location information.
///
/// Diagnostics provide detailed information about errors and warnings,
/// including:
/// - A severity level
/// - An optional error code for documentation and searchability
/// - A primary message describing the issue
/// - One or more labeled source spans
/// - Optional help text with suggestions
/// - The element context (tag, attributes and resolved style) at the time of the error
///
/// # Example
///
/// ```text
/// error[E400]: flow `f1` spans more than one container
///   --> cell.celldl:21:9
///    |
/// 21 |         <component from="p1" to="p2"/>
///    |         ^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^ potential `p2` is in compartment `c2`
///    |
///    = help: potential `p1` is in compartment `c1`; anchor the flow to a transporter
/// ```
#[derive(Debug, Clone)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    labels: Vec<Label>,
    help: Option<String>,
    context: Option<ElementContext>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    ///
    /// # Example
    ///
    /// ```
    /// # use celldl_parser::error::{Diagnostic, ErrorCode};
    /// # use celldl_parser::Span;
    ///
    /// let span = Span::new(0..10);
    /// let diag = Diagnostic::error("unknown potential `p9`")
    ///     .with_code(ErrorCode::E302)
    ///     .with_label(span, "not found")
    ///     .with_help("declare the potential in the bond graph");
    /// ```
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Get the severity of this diagnostic.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Get the error code, if any.
    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    /// Get the error category, if an error code is set.
    pub fn kind(&self) -> Option<ErrorKind> {
        self.code.map(|code| code.kind())
    }

    /// Get the primary message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get all labels attached to this diagnostic.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Get the help text, if any.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Get the element context, if any.
    pub fn context(&self) -> Option<&ElementContext> {
        self.context.as_ref()
    }

    /// Set the error code.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Add a primary label to this diagnostic.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    /// Add a secondary label to this diagnostic.
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    /// Set the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Attach the element context.
    ///
    /// An existing context is kept: the innermost element wins.
    pub fn with_context(mut self, context: ElementContext) -> Self {
        if self.context.is_none() {
            self.context = Some(context);
        }
        self
    }

    /// Move every label by `offset` bytes.
    pub(crate) fn shifted(mut self, offset: usize) -> Self {
        self.labels = self
            .labels
            .into_iter()
            .map(|label| label.shifted(offset))
            .collect();
        self
    }

    /// Drop every label.
    ///
    /// Used for diagnostics raised against text that is not part of the
    /// document, such as an external stylesheet.
    pub(crate) fn without_labels(mut self) -> Self {
        self.labels.clear();
        self
    }

    /// Create a new diagnostic with the given severity and message.
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            help: None,
            context: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: "error[E001]: message" or "error: message"
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for Diagnostic {}
