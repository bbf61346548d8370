//! Labeled source spans for diagnostic messages.

use crate::span::Span;

/// A labeled span in the document source.
///
/// # Primary vs Secondary Labels
///
/// - **Primary labels** mark the main location of an error or warning.
///   There should typically be one primary label per diagnostic.
/// - **Secondary labels** provide additional context, such as "first defined here"
///   or "potential defined here".
///
/// # Example
///
/// ```text
/// error[E204]: id `q1` is defined multiple times
///   --> cell.celldl:9:5
///    |
///  9 |     <quantity id="q1"/>
///    |     ^^^^^^^^^^^^^^^^^^^ duplicate id
///    |
///  4 |     <quantity id="q1"/>
///    |     ------------------- first defined here
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    span: Span,
    message: String,
    is_primary: bool,
}

impl Label {
    /// Create a new primary label.
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    /// Create a new secondary label.
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: false,
        }
    }

    /// Get the span this label applies to.
    pub fn span(&self) -> Span {
        self.span
    }

    /// Get the label message.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    pub fn is_secondary(&self) -> bool {
        !self.is_primary
    }

    /// The same label moved by `offset` bytes.
    pub(crate) fn shifted(self, offset: usize) -> Self {
        Self {
            span: self.span.shifted(offset),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_label() {
        let label = Label::primary(Span::new(10..20), "unexpected element");

        assert_eq!(label.span(), Span::new(10..20));
        assert_eq!(label.message(), "unexpected element");
        assert!(label.is_primary());
        assert!(!label.is_secondary());
    }

    #[test]
    fn test_secondary_label_shifted() {
        let label = Label::secondary(Span::new(5..15), "first defined here").shifted(100);

        assert_eq!(label.span(), Span::new(105..115));
        assert!(label.is_secondary());
    }
}
