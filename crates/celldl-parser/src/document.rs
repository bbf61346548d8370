//! Document loading and the element wrapper used by the builders.

use std::cell::OnceCell;

use indexmap::IndexMap;
use log::trace;

use celldl_core::{semantic::Properties, style::Style};

use crate::{
    css::StylesheetSet,
    error::{Diagnostic, ElementContext, ErrorCode, Result},
    span::Span,
};

/// The CellDL XML namespace.
pub const CELLDL_NAMESPACE: &str = "http://www.cellml.org/celldl/1.0#";

/// Tag of the document root.
pub const ROOT_TAG: &str = "cell-diagram";

/// Parse `source` as XML and check that it is a CellDL document.
pub(crate) fn load(source: &str) -> Result<roxmltree::Document<'_>> {
    let document = roxmltree::Document::parse(source).map_err(|err| {
        let pos = err.pos();
        let offset = offset_at(source, pos.row, pos.col);
        Diagnostic::error(err.to_string())
            .with_code(ErrorCode::E001)
            .with_label(Span::new(offset..offset), "document is malformed here")
    })?;

    let root = document.root_element();
    let span = Span::new(root.range());
    if let Some(namespace) = root
        .tag_name()
        .namespace()
        .filter(|namespace| *namespace != CELLDL_NAMESPACE)
    {
        return Err(Diagnostic::error("not a CellDL document")
            .with_code(ErrorCode::E003)
            .with_label(span, format!("namespace `{namespace}`"))
            .with_help(format!("use the namespace `{CELLDL_NAMESPACE}`")));
    }
    if root.tag_name().name() != ROOT_TAG {
        return Err(Diagnostic::error(format!(
            "root element must be `{ROOT_TAG}`, found `{}`",
            root.tag_name().name()
        ))
        .with_code(ErrorCode::E002)
        .with_label(span, "unexpected root element"));
    }
    Ok(document)
}

/// Byte offset of a 1-based row and character column.
fn offset_at(source: &str, row: u32, col: u32) -> usize {
    let line_start: usize = source
        .split_inclusive('\n')
        .take(row.saturating_sub(1) as usize)
        .map(str::len)
        .sum();
    let line = &source[line_start.min(source.len())..];
    line.char_indices()
        .nth(col.saturating_sub(1) as usize)
        .map_or(source.len(), |(index, _)| line_start + index)
}

/// A read-only view of a document element together with its resolved style.
///
/// The style is resolved on first use and memoized. Wrapping is cheap;
/// children are wrapped lazily as they are iterated.
#[derive(Debug, Clone)]
pub struct Element<'a, 'input> {
    node: roxmltree::Node<'a, 'input>,
    stylesheets: &'a StylesheetSet,
    style: OnceCell<Style>,
}

impl<'a, 'input> Element<'a, 'input> {
    /// Wrap `node`, resolving its style against `stylesheets`.
    pub fn new(node: roxmltree::Node<'a, 'input>, stylesheets: &'a StylesheetSet) -> Self {
        Self {
            node,
            stylesheets,
            style: OnceCell::new(),
        }
    }

    /// The element's local tag name.
    pub fn tag(&self) -> &'a str {
        self.node.tag_name().name()
    }

    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.node.attribute(name)
    }

    /// Raw attributes in document order.
    pub fn attributes(&self) -> IndexMap<String, String> {
        self.node
            .attributes()
            .map(|attribute| (attribute.name().to_string(), attribute.value().to_string()))
            .collect()
    }

    /// Location of the element in the document.
    pub fn span(&self) -> Span {
        Span::new(self.node.range())
    }

    pub fn node(&self) -> roxmltree::Node<'a, 'input> {
        self.node
    }

    /// The resolved style, computed once.
    pub fn style(&self) -> &Style {
        self.style.get_or_init(|| {
            let style = self.stylesheets.style(&self.node);
            trace!(tag = self.tag(), declarations = style.len(); "Resolved element style");
            style
        })
    }

    /// Element children in document order.
    ///
    /// Text, comments and processing instructions are skipped. Every call
    /// starts a fresh iteration.
    pub fn children(&self) -> impl Iterator<Item = Element<'a, 'input>> + use<'a, 'input> {
        let stylesheets = self.stylesheets;
        self.node
            .children()
            .filter(roxmltree::Node::is_element)
            .map(move |node| Element::new(node, stylesheets))
    }

    /// Attributes and resolved style as entity properties.
    pub fn properties(&self) -> Properties {
        Properties::new(self.attributes(), self.style().clone())
    }

    /// Snapshot used to enrich diagnostics.
    pub fn context(&self) -> ElementContext {
        ElementContext::new(
            self.tag(),
            self.attributes(),
            self.style().clone(),
            self.span(),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::css::Stylesheet;

    const DOCUMENT: &str = r#"<cell-diagram>
  <diagram>
    <!-- comment -->
    <compartment id="c1" class="cell">text<quantity id="q1"/></compartment>
    <quantity id="q2"/>
  </diagram>
</cell-diagram>"#;

    #[test]
    fn test_load_checks_root() {
        assert!(load(DOCUMENT).is_ok());

        let err = load("<diagram/>").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E002));

        let err = load(r#"<cell-diagram xmlns="http://example.org/other"/>"#).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E003));

        let namespaced = format!(r#"<cell-diagram xmlns="{CELLDL_NAMESPACE}"/>"#);
        assert!(load(&namespaced).is_ok());
    }

    #[test]
    fn test_load_reports_malformed_xml_position() {
        let source = "<cell-diagram>\n  <diagram>\n</cell-diagram>";
        let err = load(source).unwrap_err();

        assert_eq!(err.code(), Some(ErrorCode::E001));
        let offset = err.labels()[0].span().start();
        assert!(offset > 0 && offset <= source.len());
    }

    #[test]
    fn test_offset_at() {
        let source = "ab\ncdé\nf";
        assert_eq!(offset_at(source, 1, 1), 0);
        assert_eq!(offset_at(source, 2, 3), 5);
        assert_eq!(offset_at(source, 3, 1), 8);
        assert_eq!(offset_at(source, 9, 9), source.len());
    }

    #[test]
    fn test_children_are_elements_and_restartable() {
        let document = roxmltree::Document::parse(DOCUMENT).unwrap();
        let stylesheets = StylesheetSet::new();
        let root = Element::new(document.root_element(), &stylesheets);
        let diagram = root.children().next().unwrap();

        let tags: Vec<_> = diagram.children().map(|child| child.tag()).collect();
        assert_eq!(tags, vec!["compartment", "quantity"]);
        assert_eq!(diagram.children().count(), 2);
    }

    #[test]
    fn test_style_resolved_against_stylesheets() {
        let document = roxmltree::Document::parse(DOCUMENT).unwrap();
        let stylesheets: StylesheetSet = [Arc::new(
            Stylesheet::parse(".cell quantity { color: red } #q2 { color: blue }").unwrap(),
        )]
        .into_iter()
        .collect();
        let root = Element::new(document.root_element(), &stylesheets);
        let diagram = root.children().next().unwrap();
        let mut children = diagram.children();

        let compartment = children.next().unwrap();
        assert!(compartment.style().is_empty());
        let nested = compartment.children().next().unwrap();
        assert_eq!(nested.style().get("color"), Some("red"));
        let q2 = children.next().unwrap();
        assert_eq!(q2.style().get("color"), Some("blue"));
        assert!(std::ptr::eq(q2.style(), q2.style()));
    }

    #[test]
    fn test_context_snapshot() {
        let document =
            roxmltree::Document::parse(r#"<cell-diagram><flow id="f1"/></cell-diagram>"#).unwrap();
        let stylesheets = StylesheetSet::new();
        let root = Element::new(document.root_element(), &stylesheets);
        let flow = root.children().next().unwrap();

        assert_eq!(flow.context().to_string(), r#"<flow id="f1"/>"#);
        assert_eq!(flow.properties().id().map(|id| id.to_string()), Some("f1".to_string()));
    }
}
