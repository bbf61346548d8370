//! Snapshot of the element being processed when an error occurred.

use std::fmt;

use celldl_core::style::Style;
use indexmap::IndexMap;

use crate::span::Span;

/// The tag, serialized attributes and resolved style of a document element.
///
/// The parser records one of these before validating each element and
/// attaches it to any diagnostic raised while that element is current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementContext {
    tag: String,
    attributes: IndexMap<String, String>,
    style: Style,
    span: Span,
}

impl ElementContext {
    pub fn new(
        tag: impl Into<String>,
        attributes: IndexMap<String, String>,
        style: Style,
        span: Span,
    ) -> Self {
        Self {
            tag: tag.into(),
            attributes,
            style,
            span,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attributes(&self) -> &IndexMap<String, String> {
        &self.attributes
    }

    /// The element's resolved style at the time of the error.
    pub fn style(&self) -> &Style {
        &self.style
    }

    /// Location of the whole element in the document.
    pub fn span(&self) -> Span {
        self.span
    }
}

impl fmt::Display for ElementContext {
    /// Renders `<tag a="v"/>` followed by one style declaration per line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.tag)?;
        for (name, value) in &self.attributes {
            write!(f, " {name}=\"{}\"", value.replace('"', "&quot;"))?;
        }
        write!(f, "/>")?;
        if !self.style.is_empty() {
            write!(f, "\n{}", self.style)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_display() {
        let attributes = [("id", "f1"), ("transporter", "t\"1")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let style: Style = [("color", "red")].into_iter().collect();
        let context = ElementContext::new("flow", attributes, style, Span::new(0..10));

        assert_eq!(
            context.to_string(),
            "<flow id=\"f1\" transporter=\"t&quot;1\"/>\ncolor: red;"
        );
    }

    #[test]
    fn test_context_display_without_style() {
        let context =
            ElementContext::new("diagram", IndexMap::new(), Style::new(), Span::default());
        assert_eq!(context.to_string(), "<diagram/>");
    }
}
