//! Stylesheet parsing and per-sheet cascade.

use std::{borrow::Cow, ops::Range, sync::Arc};

use cssparser::{Delimiter, Parser, ParserInput, SourcePosition, Token};
use log::debug;

use celldl_core::style::Style;

use crate::{
    css::{
        selector::{Selector, SelectorElement},
        specificity::Specificity,
    },
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    span::Span,
};

/// One selector with its declaration block.
///
/// A rule written with a selector list (`a, b { ... }`) produces one
/// `StyleRule` per selector, all sharing the same declarations.
#[derive(Debug, Clone)]
pub struct StyleRule {
    selector: Selector,
    specificity: Specificity,
    declarations: Arc<Style>,
    order: usize,
}

impl StyleRule {
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn specificity(&self) -> Specificity {
        self.specificity
    }

    pub fn declarations(&self) -> &Style {
        &self.declarations
    }

    /// Position of the selector within its stylesheet, used to break specificity ties.
    pub fn order(&self) -> usize {
        self.order
    }
}

/// A parsed stylesheet.
///
/// Rules are kept sorted by `(specificity, order)`, so resolving the style
/// of an element is a single forward pass in which later matches override
/// earlier ones. Stylesheets are immutable once parsed and can be shared
/// between threads.
#[derive(Debug, Clone, Default)]
pub struct Stylesheet {
    rules: Vec<StyleRule>,
}

impl Stylesheet {
    /// Parse CSS text into a stylesheet.
    ///
    /// Diagnostic spans are byte offsets into `css`.
    ///
    /// # Examples
    ///
    /// ```
    /// use celldl_parser::css::Stylesheet;
    ///
    /// let sheet = Stylesheet::parse("quantity, potential { color: red; }").unwrap();
    /// assert_eq!(sheet.len(), 2);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns every malformed selector (E100) and malformed block or
    /// declaration (E101) found in the text.
    pub fn parse(css: &str) -> Result<Self, ParseError> {
        let css = blank_comments(css)?;
        let mut parser = SheetParser::default();
        parser.parse(&css);

        let SheetParser {
            mut rules,
            diagnostics,
        } = parser;
        diagnostics.finish()?;

        rules.sort_by_key(|rule| (rule.specificity, rule.order));
        debug!(rules = rules.len(); "Parsed stylesheet");
        Ok(Self { rules })
    }

    /// Rules in cascade order.
    pub fn rules(&self) -> &[StyleRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Merge the declarations of every rule matching `element`.
    pub fn style<E: SelectorElement>(&self, element: &E) -> Style {
        self.rules
            .iter()
            .filter(|rule| rule.selector.matches(element))
            .fold(Style::new(), |mut style, rule| {
                style.apply(&rule.declarations);
                style
            })
    }
}

type TokenResult<'i, T> = Result<T, cssparser::ParseError<'i, ()>>;

#[derive(Default)]
struct SheetParser {
    rules: Vec<StyleRule>,
    diagnostics: DiagnosticCollector,
}

impl SheetParser {
    fn parse(&mut self, css: &str) {
        let mut input = ParserInput::new(css);
        let mut parser = Parser::new(&mut input);
        loop {
            parser.skip_whitespace();
            let start = parser.position();
            let state = parser.state();
            let Ok(token) = parser.next().cloned() else {
                break;
            };
            match token {
                Token::AtKeyword(name) => {
                    skip_at_rule(&mut parser);
                    self.malformed(
                        "at-rules are not supported",
                        Span::new(start.byte_index()..start.byte_index() + name.len() + 1),
                        format!("unsupported `@{}` rule", &*name),
                    );
                }
                Token::CloseCurlyBracket => self.malformed(
                    "unmatched `}`",
                    span_from(&parser, start),
                    "no rule block is open here",
                ),
                Token::CDO | Token::CDC => {}
                _ => {
                    parser.reset(&state);
                    self.rule(&mut parser);
                }
            }
        }
    }

    fn rule<'i>(&mut self, parser: &mut Parser<'i, '_>) {
        let start = parser.position();
        let mut selectors = Vec::new();
        let _: TokenResult<'i, ()> =
            parser.parse_until_before(Delimiter::CurlyBracketBlock, |prelude| {
                self.selector_list(prelude, &mut selectors);
                Ok(())
            });

        let prelude = parser.slice_from(start).trim_end();
        if parser.expect_curly_bracket_block().is_err() {
            self.malformed(
                "expected `{` after selector",
                Span::new(start.byte_index()..start.byte_index() + prelude.len()),
                "rule has no declaration block",
            );
            return;
        }
        let declarations: TokenResult<'i, Style> =
            parser.parse_nested_block(|block| Ok(self.declarations(block)));
        let Ok(declarations) = declarations else {
            return;
        };
        if !parser.slice_from(start).ends_with('}') {
            self.malformed(
                "unterminated rule block",
                span_from(parser, start),
                "expected `}`",
            );
            return;
        }

        let declarations = Arc::new(declarations);
        for selector in selectors {
            let order = self.rules.len();
            self.rules.push(StyleRule {
                specificity: selector.specificity(),
                selector,
                declarations: Arc::clone(&declarations),
                order,
            });
        }
    }

    /// Split a rule prelude at its top-level commas and parse each selector.
    fn selector_list(&mut self, prelude: &mut Parser<'_, '_>, selectors: &mut Vec<Selector>) {
        let list_start = prelude.position().byte_index();
        prelude.skip_whitespace();
        if prelude.is_exhausted() {
            self.diagnostics.emit(
                Diagnostic::error("rule has no selector")
                    .with_code(ErrorCode::E100)
                    .with_label(Span::new(list_start..list_start + 1), "missing selector"),
            );
            return;
        }

        loop {
            let start = prelude.position();
            let _: TokenResult<'_, ()> = prelude.parse_until_before(Delimiter::Comma, |item| {
                while item.next_including_whitespace().is_ok() {}
                Ok(())
            });
            let text = prelude.slice_from(start);
            if let Some(selector) = self.selector(text, start.byte_index()) {
                selectors.push(selector);
            }
            if prelude.next().is_err() {
                break;
            }
        }
    }

    fn selector(&mut self, text: &str, offset: usize) -> Option<Selector> {
        let leading = text.len() - text.trim_start().len();
        let span = Span::new(offset + leading..offset + text.trim_end().len());
        if text.trim().is_empty() {
            self.diagnostics.emit(
                Diagnostic::error("empty selector in selector list")
                    .with_code(ErrorCode::E100)
                    .with_label(
                        Span::new(offset..offset + text.len().max(1)),
                        "missing selector",
                    ),
            );
            return None;
        }

        match Selector::parse(text) {
            Ok(selector) => Some(selector),
            Err(err) => {
                let at = span.start() + err.offset();
                let mut diagnostic =
                    Diagnostic::error(format!("malformed selector `{}`", err.selector()))
                        .with_code(ErrorCode::E100)
                        .with_label(Span::new(at..(at + 1).min(span.end().max(at))), err.reason());
                if err.reason().contains("pseudo") {
                    diagnostic = diagnostic.with_help("use a class or attribute selector instead");
                }
                self.diagnostics.emit(diagnostic);
                None
            }
        }
    }

    /// Parse `property: value` declarations up to the end of a rule block.
    ///
    /// Values are kept as written. Quoted strings and bracketed groups may
    /// contain `;`, `,` and `}`.
    fn declarations<'i>(&mut self, block: &mut Parser<'i, '_>) -> Style {
        let mut style = Style::new();
        loop {
            let state = block.state();
            match block.next() {
                Ok(Token::Semicolon) => continue,
                Ok(_) => block.reset(&state),
                Err(_) => break,
            }

            let start = block.position();
            let declaration: TokenResult<'i, (String, String)> = block
                .parse_until_before(Delimiter::Semicolon, |declaration| {
                    parse_declaration(declaration)
                });

            let text = block.slice_from(start);
            match declaration {
                Ok((property, value)) => style.set(property, value),
                Err(_) => self.diagnostics.emit(
                    Diagnostic::error(format!("malformed declaration `{}`", text.trim()))
                        .with_code(ErrorCode::E101)
                        .with_label(
                            Span::new(
                                start.byte_index()..start.byte_index() + text.trim_end().len(),
                            ),
                            "expected `property: value`",
                        ),
                ),
            }
        }
        style
    }

    fn malformed(&mut self, message: &str, span: Span, label: impl Into<String>) {
        self.diagnostics.emit(
            Diagnostic::error(message)
                .with_code(ErrorCode::E101)
                .with_label(span, label),
        );
    }
}

fn parse_declaration<'i>(parser: &mut Parser<'i, '_>) -> TokenResult<'i, (String, String)> {
    let property = parser.expect_ident()?.to_ascii_lowercase();
    parser.expect_colon()?;
    parser.skip_whitespace();
    let value_start = parser.position();
    loop {
        match parser.next_including_whitespace() {
            Ok(Token::CurlyBracketBlock | Token::BadString(_) | Token::BadUrl(_)) => {
                return Err(parser.new_custom_error(()));
            }
            Ok(_) => {}
            Err(_) => break,
        }
    }
    let value = parser.slice_from(value_start).trim();
    if value.is_empty() {
        return Err(parser.new_custom_error(()));
    }
    Ok((property, value.to_string()))
}

fn span_from(parser: &Parser<'_, '_>, start: SourcePosition) -> Span {
    Span::new(start.byte_index()..parser.position().byte_index())
}

/// Consume an at-rule through its terminating `;` or block.
fn skip_at_rule(parser: &mut Parser<'_, '_>) {
    loop {
        match parser.next() {
            Ok(Token::CurlyBracketBlock) => {
                let _: TokenResult<'_, ()> = parser.parse_nested_block(|_| Ok(()));
                break;
            }
            Ok(Token::Semicolon) | Err(_) => break,
            Ok(_) => {}
        }
    }
}

/// Replace every `/* ... */` comment with spaces, keeping byte offsets intact.
///
/// Comment markers inside quoted strings are left alone.
fn blank_comments(css: &str) -> Result<Cow<'_, str>, Diagnostic> {
    let mut comments = Vec::new();
    {
        let mut input = ParserInput::new(css);
        let mut parser = Parser::new(&mut input);
        collect_comments(&mut parser, &mut comments);
    }
    if comments.is_empty() {
        return Ok(Cow::Borrowed(css));
    }

    if let Some(last) = comments.last().filter(|range| {
        let comment = &css[(*range).clone()];
        comment.len() < 4 || !comment.ends_with("*/")
    }) {
        return Err(Diagnostic::error("unterminated comment")
            .with_code(ErrorCode::E101)
            .with_label(Span::new(last.start..last.start + 2), "comment starts here")
            .with_help("close the comment with `*/`"));
    }

    let mut blanked = css.to_string();
    for range in comments {
        let width = range.len();
        blanked.replace_range(range, &" ".repeat(width));
    }
    Ok(Cow::Owned(blanked))
}

fn collect_comments(parser: &mut Parser<'_, '_>, comments: &mut Vec<Range<usize>>) {
    loop {
        let start = parser.position().byte_index();
        match parser.next_including_whitespace_and_comments() {
            Ok(Token::Comment(_)) => comments.push(start..parser.position().byte_index()),
            Ok(
                Token::Function(_)
                | Token::ParenthesisBlock
                | Token::SquareBracketBlock
                | Token::CurlyBracketBlock,
            ) => {
                let _: TokenResult<'_, ()> = parser.parse_nested_block(|nested| {
                    collect_comments(nested, comments);
                    Ok(())
                });
            }
            Ok(_) => {}
            Err(_) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::selector::tests::TestElement;

    fn style_of(css: &str, element: &TestElement<'_>) -> Style {
        Stylesheet::parse(css).unwrap().style(element)
    }

    #[test]
    fn test_higher_specificity_wins_regardless_of_order() {
        let element = TestElement::new("p", &[("id", "y"), ("class", "x")]);

        assert_eq!(style_of(".x{a:1} #y{a:2}", &element).get("a"), Some("2"));
        assert_eq!(style_of("#y{a:2} .x{a:1}", &element).get("a"), Some("2"));
    }

    #[test]
    fn test_later_rule_wins_on_equal_specificity() {
        let element = TestElement::new("p", &[]);
        assert_eq!(style_of("p{a:1} p{a:2}", &element).get("a"), Some("2"));
    }

    #[test]
    fn test_selector_list_shares_declarations() {
        let sheet = Stylesheet::parse("quantity, #p1 { color: red; stroke: blue }").unwrap();

        assert_eq!(sheet.len(), 2);
        let orders: Vec<_> = sheet.rules().iter().map(StyleRule::order).collect();
        // Sorted by specificity: `quantity` (order 0) before `#p1` (order 1)
        assert_eq!(orders, vec![0, 1]);
        assert_eq!(sheet.rules()[1].declarations().get("stroke"), Some("blue"));
    }

    #[test]
    fn test_non_matching_rules_are_ignored() {
        let element = TestElement::new("quantity", &[("class", "ion")]);
        let style = style_of("compartment { color: red } .ion { stroke: black }", &element);

        assert_eq!(style.get("color"), None);
        assert_eq!(style.get("stroke"), Some("black"));
    }

    #[test]
    fn test_comments_and_whitespace() {
        let css = "/* base */\n quantity {\n  color : green ; /* why */\n  STROKE-WIDTH: 2;\n}\n";
        let element = TestElement::new("quantity", &[]);
        let style = style_of(css, &element);

        assert_eq!(style.get("color"), Some("green"));
        assert_eq!(style.get("stroke-width"), Some("2"));
    }

    #[test]
    fn test_empty_stylesheet() {
        let sheet = Stylesheet::parse("  /* nothing */ ").unwrap();
        assert!(sheet.is_empty());
        assert!(sheet.style(&TestElement::new("quantity", &[])).is_empty());
    }

    #[test]
    fn test_style_is_idempotent() {
        let sheet = Stylesheet::parse("quantity{a:1} .b{a:2; c:3}").unwrap();
        let element = TestElement::new("quantity", &[("class", "b")]);

        assert_eq!(sheet.style(&element), sheet.style(&element));
    }

    #[test]
    fn test_all_malformed_selectors_reported() {
        let css = "p:hover { a: 1 }\nq { b: 2 }\n::before, r { c: 3 }";
        let err = Stylesheet::parse(css).unwrap_err();

        assert_eq!(err.diagnostics().len(), 2);
        assert!(
            err.diagnostics()
                .iter()
                .all(|d| d.code() == Some(ErrorCode::E100))
        );
        let first = err.diagnostics()[0].labels()[0].span();
        assert_eq!(&css[first.range()], ":");
    }

    #[test]
    fn test_malformed_blocks() {
        let cases = [
            "p { a: 1 ",
            "p",
            "} p { a: 1 }",
            "@media print { p { a: 1 } }",
            "p { a }",
            "p { a: 1 } /* open",
        ];
        for css in cases {
            let err = Stylesheet::parse(css).unwrap_err();
            assert_eq!(
                err.diagnostics()[0].code(),
                Some(ErrorCode::E101),
                "expected E101 for {css:?}"
            );
        }
    }

    #[test]
    fn test_quoted_values_keep_delimiters() {
        let element = TestElement::new("p", &[]);
        let style = style_of(r#"p { label: "a;b"; title: "}" } q { a: 1 }"#, &element);

        assert_eq!(style.get("label"), Some(r#""a;b""#));
        assert_eq!(style.get("title"), Some(r#""}""#));
        assert_eq!(style.get("a"), None);
    }

    #[test]
    fn test_comma_inside_attribute_selector() {
        let sheet = Stylesheet::parse(r#"[label="a,b"], q { color: red }"#).unwrap();
        assert_eq!(sheet.len(), 2);

        let element = TestElement::new("p", &[("label", "a,b")]);
        assert_eq!(sheet.style(&element).get("color"), Some("red"));
    }

    #[test]
    fn test_comment_markers_inside_strings() {
        let element = TestElement::new("p", &[]);
        let style = style_of(r#"p { label: "/* kept */" } /* dropped */"#, &element);

        assert_eq!(style.get("label"), Some(r#""/* kept */""#));
    }

    #[test]
    fn test_declaration_errors_are_collected() {
        let css = "p { a; b: 1; : 2 } q { c: }";
        let err = Stylesheet::parse(css).unwrap_err();

        assert_eq!(err.diagnostics().len(), 3);
        let first = err.diagnostics()[0].labels()[0].span();
        assert_eq!(&css[first.range()], "a");
    }

    #[test]
    fn test_stylesheet_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Stylesheet>();
    }
}
