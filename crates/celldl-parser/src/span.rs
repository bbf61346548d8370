//! Byte spans into the document source.

use std::ops::Range;

/// A half-open byte range into the document source.
///
/// Every diagnostic label points into the CellDL document through a span,
/// which lets the CLI render source snippets for any error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
    start: usize,
    end: usize,
}

impl Span {
    /// Create a span from a byte range.
    pub fn new(range: Range<usize>) -> Self {
        Self {
            start: range.start,
            end: range.end.max(range.start),
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The span as a byte range.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Move the span by `offset` bytes.
    ///
    /// Used to map spans reported against an embedded text, such as an
    /// inline stylesheet, back into the enclosing document.
    pub fn shifted(self, offset: usize) -> Self {
        Self::new(self.start + offset..self.end + offset)
    }

    /// The smallest span covering both spans.
    pub fn union(self, other: Self) -> Self {
        Self::new(self.start.min(other.start)..self.end.max(other.end))
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self::new(range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_accessors() {
        let span = Span::new(4..10);
        assert_eq!(span.start(), 4);
        assert_eq!(span.end(), 10);
        assert_eq!(span.len(), 6);
        assert!(!span.is_empty());
        assert!(Span::new(3..3).is_empty());
    }

    #[test]
    fn test_span_shifted_and_union() {
        assert_eq!(Span::new(2..5).shifted(10), Span::new(12..15));
        assert_eq!(Span::new(8..12).union(Span::new(2..5)), Span::new(2..12));
    }
}
