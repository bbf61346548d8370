//! Per-parse diagnostics context.

use crate::{
    document::Element,
    error::{Diagnostic, ElementContext},
};

/// Records the element most recently dispatched by the builders.
///
/// Builders record every element before validating it, so when a
/// diagnostic escapes, the recorded element is the one that failed. The
/// context is owned by a single parse and never shared.
#[derive(Debug, Default)]
pub(crate) struct DiagnosticsContext {
    last: Option<ElementContext>,
}

impl DiagnosticsContext {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, element: &Element<'_, '_>) {
        self.last = Some(element.context());
    }

    /// Attach the last recorded element to `diagnostic`.
    pub(crate) fn enrich(&self, diagnostic: Diagnostic) -> Diagnostic {
        match &self.last {
            Some(context) => diagnostic.with_context(context.clone()),
            None => diagnostic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::StylesheetSet;

    #[test]
    fn test_enrich_uses_last_recorded_element() {
        let document =
            roxmltree::Document::parse(r#"<cell-diagram><a id="1"/><b id="2"/></cell-diagram>"#)
                .unwrap();
        let stylesheets = StylesheetSet::new();
        let root = Element::new(document.root_element(), &stylesheets);
        let mut context = DiagnosticsContext::new();

        let plain = context.enrich(Diagnostic::error("before"));
        assert!(plain.context().is_none());

        for child in root.children() {
            context.record(&child);
        }
        let enriched = context.enrich(Diagnostic::error("after"));
        assert_eq!(enriched.context().map(ElementContext::tag), Some("b"));
    }
}
