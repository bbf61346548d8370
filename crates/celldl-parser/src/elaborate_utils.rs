//! Helpers shared by the structural builders.

use std::collections::{HashMap, hash_map::Entry};

use celldl_core::{identifier::Id, semantic::Properties};

use crate::{
    document::Element,
    error::{Diagnostic, ErrorCode, Result},
    span::Span,
};

/// Normalize an element reference, accepting both `q1` and `#q1`.
pub(crate) fn reference_id(reference: &str) -> Option<Id> {
    let reference = reference.trim();
    let reference = reference.strip_prefix('#').unwrap_or(reference);
    (!reference.is_empty()).then(|| Id::new(reference))
}

/// Split a whitespace-separated list of references.
pub(crate) fn reference_list(references: &str) -> Vec<&str> {
    references.split_whitespace().collect()
}

/// Diagnostic for an element whose tag is not allowed under `parent`.
pub(crate) fn unexpected_element(
    element: &Element<'_, '_>,
    parent: &str,
    allowed: &[&str],
) -> Diagnostic {
    let expected = allowed
        .iter()
        .map(|tag| format!("`{tag}`"))
        .collect::<Vec<_>>()
        .join(", ");
    Diagnostic::error(format!(
        "unexpected element `{}` in `{parent}`",
        element.tag()
    ))
    .with_code(ErrorCode::E200)
    .with_label(element.span(), "not allowed here")
    .with_help(format!("`{parent}` may only contain {expected}"))
}

/// Element ids declared so far, with where they were declared.
#[derive(Debug, Default)]
pub(crate) struct IdRegistry {
    spans: HashMap<Id, Span>,
}

impl IdRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Claim the id of `element`.
    ///
    /// Fails with E203 when the element has no id and with E204 when the id
    /// was already claimed.
    pub(crate) fn declare(
        &mut self,
        element: &Element<'_, '_>,
        properties: &Properties,
    ) -> Result<Id> {
        let Some(id) = properties.id() else {
            return Err(
                Diagnostic::error(format!("`{}` element has no `id`", element.tag()))
                    .with_code(ErrorCode::E203)
                    .with_label(element.span(), "missing `id` attribute")
                    .with_help(format!("give the `{}` a unique `id`", element.tag())),
            );
        };

        match self.spans.entry(id) {
            Entry::Occupied(first) => Err(Diagnostic::error(format!(
                "id `{id}` is defined multiple times"
            ))
            .with_code(ErrorCode::E204)
            .with_label(element.span(), "duplicate id")
            .with_secondary_label(*first.get(), "first defined here")
            .with_help("element ids must be unique across the diagram")),
            Entry::Vacant(slot) => {
                slot.insert(element.span());
                Ok(id)
            }
        }
    }

    /// Where `id` was declared.
    pub(crate) fn span(&self, id: Id) -> Option<Span> {
        self.spans.get(&id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::StylesheetSet;

    #[test]
    fn test_reference_id() {
        assert_eq!(reference_id("q1"), Some(Id::new("q1")));
        assert_eq!(reference_id(" #q1 "), Some(Id::new("q1")));
        assert_eq!(reference_id("#"), None);
        assert_eq!(reference_id("  "), None);
    }

    #[test]
    fn test_reference_list() {
        assert_eq!(reference_list(" p1  #p2\tp3 "), vec!["p1", "#p2", "p3"]);
        assert!(reference_list("").is_empty());
    }

    #[test]
    fn test_id_registry() {
        let document = roxmltree::Document::parse(
            r#"<diagram><quantity id="q1"/><quantity id="q1"/><quantity/></diagram>"#,
        )
        .unwrap();
        let stylesheets = StylesheetSet::new();
        let diagram = Element::new(document.root_element(), &stylesheets);
        let children: Vec<_> = diagram.children().collect();
        let mut registry = IdRegistry::new();

        let id = registry
            .declare(&children[0], &children[0].properties())
            .unwrap();
        assert_eq!(registry.span(id), Some(children[0].span()));

        let duplicate = registry
            .declare(&children[1], &children[1].properties())
            .unwrap_err();
        assert_eq!(duplicate.code(), Some(ErrorCode::E204));
        assert_eq!(duplicate.labels()[1].span(), children[0].span());

        let missing = registry
            .declare(&children[2], &children[2].properties())
            .unwrap_err();
        assert_eq!(missing.code(), Some(ErrorCode::E203));
    }
}
