//! Assembly of the stylesheet set for a document.

use std::{iter, sync::Arc};

use log::{debug, info};

use crate::{
    config::ParseConfig,
    css::{Stylesheet, StylesheetSet},
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    span::Span,
};

/// Build the stylesheet set for the document rooted at `root`.
///
/// Precedence, lowest first: the configured user stylesheets, then the
/// document's `<style>` sheets in document order. An external
/// `<style href="...">` (or `src`) sheet is loaded in place, so it
/// overrides the sheets before it and is overridden by the sheets after
/// it. All stylesheet errors are collected before failing.
pub(crate) fn stylesheets(
    root: roxmltree::Node<'_, '_>,
    config: &ParseConfig,
) -> Result<StylesheetSet, ParseError> {
    let mut diagnostics = DiagnosticCollector::new();
    let mut sheets = Vec::new();

    for node in root
        .children()
        .filter(|node| node.is_element() && node.tag_name().name() == "style")
    {
        let span = Span::new(node.range());
        match node.attribute("href").or_else(|| node.attribute("src")) {
            Some(reference) => {
                if let Some(sheet) = load_external(reference, span, config, &mut diagnostics) {
                    sheets.push(sheet);
                }
            }
            None => {
                let Some((offset, css)) = inline_text(node) else {
                    continue;
                };
                match Stylesheet::parse(&css) {
                    Ok(sheet) => {
                        debug!(rules = sheet.len(); "Loaded inline stylesheet");
                        sheets.push(sheet);
                    }
                    Err(err) => diagnostics.emit_all(err.map(|d| d.shifted(offset))),
                }
            }
        }
    }
    diagnostics.finish()?;

    let set: StylesheetSet = config
        .stylesheets()
        .iter()
        .cloned()
        .chain(sheets.into_iter().map(Arc::new))
        .collect();
    info!(stylesheets = set.len(); "Stylesheet set built");
    Ok(set)
}

/// The CSS text of an inline `<style>` and its offset in the document.
///
/// Text split by XML comments or processing instructions is joined, with
/// the gaps padded by spaces so that offsets into the text stay aligned
/// with the document.
fn inline_text(node: roxmltree::Node<'_, '_>) -> Option<(usize, String)> {
    let mut texts = node.children().filter(roxmltree::Node::is_text);
    let first = texts.next()?;
    let offset = first.range().start;
    let mut css = first.text().unwrap_or_default().to_string();
    for text in texts {
        let gap = (text.range().start - offset).saturating_sub(css.len());
        css.extend(iter::repeat_n(' ', gap));
        css.push_str(text.text().unwrap_or_default());
    }
    Some((offset, css))
}

fn load_external(
    reference: &str,
    span: Span,
    config: &ParseConfig,
    diagnostics: &mut DiagnosticCollector,
) -> Option<Stylesheet> {
    let Some(loader) = config.loader() else {
        diagnostics.emit(
            Diagnostic::warning(format!(
                "external stylesheet `{reference}` skipped, no stylesheet loader is configured"
            ))
            .with_code(ErrorCode::E102)
            .with_label(span, "skipped"),
        );
        return None;
    };

    let css = match loader.load(reference) {
        Ok(css) => css,
        Err(err) => {
            diagnostics.emit(
                Diagnostic::error(format!("cannot load stylesheet `{reference}`: {err}"))
                    .with_code(ErrorCode::E102)
                    .with_label(span, "referenced here"),
            );
            return None;
        }
    };

    match Stylesheet::parse(&css) {
        Ok(sheet) => {
            debug!(reference = reference, rules = sheet.len(); "Loaded external stylesheet");
            Some(sheet)
        }
        Err(err) => {
            diagnostics.emit_all(err.map(|d| {
                d.without_labels()
                    .with_label(span, format!("in stylesheet `{reference}`"))
            }));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, io};

    use super::*;
    use crate::config::StylesheetLoader;

    struct MapLoader(HashMap<&'static str, &'static str>);

    impl StylesheetLoader for MapLoader {
        fn load(&self, reference: &str) -> io::Result<String> {
            self.0
                .get(reference)
                .map(|css| css.to_string())
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such stylesheet"))
        }
    }

    fn color_of_root(source: &str, config: &ParseConfig) -> Option<String> {
        let document = roxmltree::Document::parse(source).unwrap();
        let set = stylesheets(document.root_element(), config).unwrap();
        set.style(&document.root_element())
            .get("color")
            .map(str::to_string)
    }

    #[test]
    fn test_sheets_apply_in_document_order() {
        let config = || {
            ParseConfig::new()
                .with_stylesheet(Stylesheet::parse("#root { color: user }").unwrap())
                .with_loader(MapLoader(HashMap::from([(
                    "a.css",
                    "cell-diagram { color: external }",
                )])))
        };

        let inline_first = r#"<cell-diagram id="root">
            <style>cell-diagram { color: inline }</style>
            <style href="a.css"/>
        </cell-diagram>"#;
        assert_eq!(
            color_of_root(inline_first, &config()).as_deref(),
            Some("external")
        );

        let external_first = r#"<cell-diagram id="root">
            <style href="a.css"/>
            <style>cell-diagram { color: inline }</style>
        </cell-diagram>"#;
        assert_eq!(
            color_of_root(external_first, &config()).as_deref(),
            Some("inline")
        );
    }

    #[test]
    fn test_inline_text_split_by_xml_comment() {
        let source = concat!(
            "<cell-diagram><style>diagram { a: 1 }<!-- note -->",
            "cell-diagram { color: red }</style></cell-diagram>"
        );
        assert_eq!(
            color_of_root(source, &ParseConfig::new()).as_deref(),
            Some("red")
        );

        let source = concat!(
            "<cell-diagram><style>a { x: 1 }<!-- note -->",
            "b:hover { x: 2 }</style></cell-diagram>"
        );
        let document = roxmltree::Document::parse(source).unwrap();
        let err = stylesheets(document.root_element(), &ParseConfig::new()).unwrap_err();
        let span = err.diagnostics()[0].labels()[0].span();
        assert_eq!(&source[span.range()], ":");
    }

    #[test]
    fn test_external_overrides_user() {
        let source = r#"<cell-diagram id="root"><style src="a.css"/></cell-diagram>"#;
        let loader = MapLoader(HashMap::from([("a.css", "cell-diagram { color: external }")]));
        let config = ParseConfig::new()
            .with_stylesheet(Stylesheet::parse("#root { color: user }").unwrap())
            .with_loader(loader);

        assert_eq!(color_of_root(source, &config).as_deref(), Some("external"));
    }

    #[test]
    fn test_external_skipped_without_loader() {
        let source = r#"<cell-diagram><style href="a.css"/></cell-diagram>"#;
        assert_eq!(color_of_root(source, &ParseConfig::new()), None);
    }

    #[test]
    fn test_missing_external_is_an_error() {
        let source = r#"<cell-diagram><style href="missing.css"/></cell-diagram>"#;
        let document = roxmltree::Document::parse(source).unwrap();
        let config = ParseConfig::new().with_loader(MapLoader(HashMap::new()));

        let err = stylesheets(document.root_element(), &config).unwrap_err();
        assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E102));
    }

    #[test]
    fn test_inline_selector_errors_point_into_document() {
        let source = "<cell-diagram><style>a{x:1} b:hover{x:2}</style></cell-diagram>";
        let document = roxmltree::Document::parse(source).unwrap();

        let err = stylesheets(document.root_element(), &ParseConfig::new()).unwrap_err();
        let span = err.diagnostics()[0].labels()[0].span();
        assert_eq!(&source[span.range()], ":");
    }

    #[test]
    fn test_errors_from_every_sheet_are_collected() {
        let source = r#"<cell-diagram>
            <style>a:hover { x: 1 }</style>
            <style href="bad.css"/>
        </cell-diagram>"#;
        let document = roxmltree::Document::parse(source).unwrap();
        let loader = MapLoader(HashMap::from([("bad.css", "b::after { x: 2 }")]));
        let config = ParseConfig::new().with_loader(loader);

        let err = stylesheets(document.root_element(), &config).unwrap_err();
        assert_eq!(err.diagnostics().len(), 2);
        assert_eq!(
            err.diagnostics()[1].labels()[0].message(),
            "in stylesheet `bad.css`"
        );
    }
}
