//! Collector for accumulating diagnostics during a processing phase.
//!
//! The [`DiagnosticCollector`] allows phases to report multiple errors
//! and warnings instead of failing on the first error encountered.

use log::warn;

use crate::error::{Diagnostic, ParseError};

/// A collector for accumulating diagnostics during a processing phase.
///
/// Stylesheet construction uses it so that every malformed selector of
/// every stylesheet is reported in a single run.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    has_errors: bool,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a diagnostic to this collector.
    ///
    /// Warnings are logged as they arrive.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity().is_error() {
            self.has_errors = true;
        } else {
            warn!(code:? = diagnostic.code(); "{}", diagnostic.message());
        }
        self.diagnostics.push(diagnostic);
    }

    /// Emit every diagnostic of a parse error.
    pub fn emit_all(&mut self, err: ParseError) {
        for diagnostic in err.into_diagnostics() {
            self.emit(diagnostic);
        }
    }

    /// Finish collection and return a result.
    ///
    /// - If there are errors, returns `Err(ParseError)` with all diagnostics.
    /// - If there are no errors, returns `Ok(())`.
    pub fn finish(self) -> Result<(), ParseError> {
        if self.has_errors {
            Err(ParseError::new(self.diagnostics))
        } else {
            Ok(())
        }
    }
}
