//! Selector parsing and matching.
//!
//! Supported syntax is the structural subset of CSS selectors: type and
//! universal selectors, `.class`, `#id`, attribute selectors with every CSS
//! operator, and the descendant and child combinators. Pseudo-classes and
//! pseudo-elements are rejected.

use std::fmt;

use thiserror::Error;
use winnow::{
    Parser as _,
    ascii::{multispace0, multispace1},
    combinator::{alt, delimited, opt, preceded, repeat},
    error::{ContextError, ErrMode, ModalResult},
    token::{literal, take_till, take_while},
};

use crate::css::specificity::Specificity;

type IResult<O> = ModalResult<O, ContextError>;

/// A selector that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed selector `{selector}`: {reason}")]
pub struct SelectorError {
    selector: String,
    offset: usize,
    reason: String,
}

impl SelectorError {
    /// The selector text as written.
    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Byte offset of the first unparsable character in the selector.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// The view of a document element that selectors match against.
pub trait SelectorElement: Sized {
    /// The element's local tag name.
    fn local_name(&self) -> &str;

    /// The value of an attribute, if present.
    fn attribute(&self, name: &str) -> Option<&str>;

    /// The parent element, if any.
    fn parent(&self) -> Option<Self>;

    fn id(&self) -> Option<&str> {
        self.attribute("id")
    }

    fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }
}

impl SelectorElement for roxmltree::Node<'_, '_> {
    fn local_name(&self) -> &str {
        self.tag_name().name()
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        roxmltree::Node::attribute(self, name)
    }

    fn parent(&self) -> Option<Self> {
        self.parent_element()
    }
}

/// Attribute selector operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeOperator {
    /// `[attr]`
    Exists,
    /// `[attr=v]`
    Equals,
    /// `[attr~=v]`, whitespace-separated list contains `v`
    Includes,
    /// `[attr|=v]`, exactly `v` or starting with `v-`
    DashMatch,
    /// `[attr^=v]`
    Prefix,
    /// `[attr$=v]`
    Suffix,
    /// `[attr*=v]`
    Substring,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttributeSelector {
    name: String,
    operator: AttributeOperator,
    value: String,
}

impl AttributeSelector {
    fn matches<E: SelectorElement>(&self, element: &E) -> bool {
        let Some(actual) = element.attribute(&self.name) else {
            return false;
        };
        let expected = self.value.as_str();
        match self.operator {
            AttributeOperator::Exists => true,
            AttributeOperator::Equals => actual == expected,
            AttributeOperator::Includes => {
                !expected.is_empty() && actual.split_whitespace().any(|word| word == expected)
            }
            AttributeOperator::DashMatch => {
                actual == expected
                    || actual
                        .strip_prefix(expected)
                        .is_some_and(|rest| rest.starts_with('-'))
            }
            AttributeOperator::Prefix => !expected.is_empty() && actual.starts_with(expected),
            AttributeOperator::Suffix => !expected.is_empty() && actual.ends_with(expected),
            AttributeOperator::Substring => !expected.is_empty() && actual.contains(expected),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SimpleSelector {
    Id(String),
    Class(String),
    Attribute(AttributeSelector),
}

impl SimpleSelector {
    fn matches<E: SelectorElement>(&self, element: &E) -> bool {
        match self {
            SimpleSelector::Id(id) => element.id() == Some(id.as_str()),
            SimpleSelector::Class(class) => element.has_class(class),
            SimpleSelector::Attribute(attribute) => attribute.matches(element),
        }
    }
}

/// A sequence of simple selectors that all apply to one element, e.g. `quantity.ion[name]`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Compound {
    /// `None` for the universal selector or when no type is written.
    tag: Option<String>,
    simple: Vec<SimpleSelector>,
}

impl Compound {
    fn matches<E: SelectorElement>(&self, element: &E) -> bool {
        self.tag
            .as_deref()
            .is_none_or(|tag| element.local_name() == tag)
            && self.simple.iter().all(|simple| simple.matches(element))
    }

    fn specificity(&self) -> Specificity {
        let ids = self
            .simple
            .iter()
            .filter(|simple| matches!(simple, SimpleSelector::Id(_)))
            .count();
        let classes = self.simple.len() - ids;
        let types = usize::from(self.tag.is_some());
        Specificity::new(ids, classes, types)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    /// Whitespace: any ancestor.
    Descendant,
    /// `>`: the parent.
    Child,
}

/// A parsed complex selector such as `compartment > quantity.ion`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    text: String,
    /// Compounds from outermost to the subject.
    compounds: Vec<Compound>,
    /// `combinators[i]` joins `compounds[i]` and `compounds[i + 1]`.
    combinators: Vec<Combinator>,
}

impl Selector {
    /// Parse a single selector (no commas).
    ///
    /// # Examples
    ///
    /// ```
    /// use celldl_parser::css::Selector;
    ///
    /// let selector = Selector::parse("compartment > quantity.ion").unwrap();
    /// assert_eq!(selector.to_string(), "compartment > quantity.ion");
    ///
    /// assert!(Selector::parse("quantity:hover").is_err());
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a [`SelectorError`] pointing at the first character that
    /// could not be parsed.
    pub fn parse(text: &str) -> Result<Self, SelectorError> {
        let text = text.trim();
        let (first, rest) = complex_selector.parse(text).map_err(|err| {
            let offset = err.offset();
            let reason = match text[offset..].chars().next() {
                Some(':') => "pseudo-classes and pseudo-elements are not supported".to_string(),
                Some(c) => format!("unexpected `{c}`"),
                None => "unexpected end of selector".to_string(),
            };
            SelectorError {
                selector: text.to_string(),
                offset,
                reason,
            }
        })?;

        let mut compounds = vec![first];
        let mut combinators = Vec::with_capacity(rest.len());
        for (combinator, compound) in rest {
            combinators.push(combinator);
            compounds.push(compound);
        }

        Ok(Self {
            text: text.to_string(),
            compounds,
            combinators,
        })
    }

    /// The selector text as written, trimmed.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Specificity summed over every compound.
    pub fn specificity(&self) -> Specificity {
        self.compounds
            .iter()
            .map(Compound::specificity)
            .fold(Specificity::default(), |total, s| total + s)
    }

    /// Check whether `element` is matched by this selector.
    pub fn matches<E: SelectorElement>(&self, element: &E) -> bool {
        self.matches_from(self.compounds.len() - 1, element)
    }

    fn matches_from<E: SelectorElement>(&self, index: usize, element: &E) -> bool {
        if !self.compounds[index].matches(element) {
            return false;
        }
        if index == 0 {
            return true;
        }
        match self.combinators[index - 1] {
            Combinator::Child => element
                .parent()
                .is_some_and(|parent| self.matches_from(index - 1, &parent)),
            Combinator::Descendant => {
                let mut ancestor = element.parent();
                while let Some(current) = ancestor {
                    if self.matches_from(index - 1, &current) {
                        return true;
                    }
                    ancestor = current.parent();
                }
                false
            }
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn identifier<'a>(input: &mut &'a str) -> IResult<&'a str> {
    take_while(1.., |c: char| c.is_alphanumeric() || c == '-' || c == '_').parse_next(input)
}

fn quoted<'a>(input: &mut &'a str) -> IResult<&'a str> {
    alt((
        delimited('"', take_till(0.., '"'), '"'),
        delimited('\'', take_till(0.., '\''), '\''),
    ))
    .parse_next(input)
}

fn attribute_operator(input: &mut &str) -> IResult<AttributeOperator> {
    alt((
        literal("~=").value(AttributeOperator::Includes),
        literal("|=").value(AttributeOperator::DashMatch),
        literal("^=").value(AttributeOperator::Prefix),
        literal("$=").value(AttributeOperator::Suffix),
        literal("*=").value(AttributeOperator::Substring),
        literal("=").value(AttributeOperator::Equals),
    ))
    .parse_next(input)
}

/// `[name]` or `[name op value]`, value quoted or bare.
fn attribute_selector(input: &mut &str) -> IResult<AttributeSelector> {
    delimited(
        ('[', multispace0),
        (
            identifier,
            multispace0,
            opt((
                attribute_operator,
                multispace0,
                alt((quoted, identifier)),
                multispace0,
            )),
        ),
        ']',
    )
    .map(|(name, _, comparison)| match comparison {
        Some((operator, _, value, _)) => AttributeSelector {
            name: name.to_string(),
            operator,
            value: value.to_string(),
        },
        None => AttributeSelector {
            name: name.to_string(),
            operator: AttributeOperator::Exists,
            value: String::new(),
        },
    })
    .parse_next(input)
}

fn simple_selector(input: &mut &str) -> IResult<SimpleSelector> {
    alt((
        preceded('#', identifier).map(|id: &str| SimpleSelector::Id(id.to_string())),
        preceded('.', identifier).map(|class: &str| SimpleSelector::Class(class.to_string())),
        attribute_selector.map(SimpleSelector::Attribute),
    ))
    .parse_next(input)
}

fn compound_selector(input: &mut &str) -> IResult<Compound> {
    let tag = opt(alt((
        '*'.value(None),
        identifier.map(|tag: &str| Some(tag.to_string())),
    )))
    .parse_next(input)?;
    let simple: Vec<SimpleSelector> = repeat(0.., simple_selector).parse_next(input)?;

    if tag.is_none() && simple.is_empty() {
        return Err(ErrMode::Backtrack(ContextError::new()));
    }
    Ok(Compound {
        tag: tag.flatten(),
        simple,
    })
}

fn combinator(input: &mut &str) -> IResult<Combinator> {
    alt((
        (multispace0, '>', multispace0).value(Combinator::Child),
        multispace1.value(Combinator::Descendant),
    ))
    .parse_next(input)
}

fn complex_selector(input: &mut &str) -> IResult<(Compound, Vec<(Combinator, Compound)>)> {
    (compound_selector, repeat(0.., (combinator, compound_selector))).parse_next(input)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A minimal element tree for matching tests.
    #[derive(Debug, Clone)]
    pub(crate) struct TestElement<'a> {
        pub(crate) name: &'a str,
        pub(crate) attributes: Vec<(&'a str, &'a str)>,
        pub(crate) parent: Option<Box<TestElement<'a>>>,
    }

    impl<'a> TestElement<'a> {
        pub(crate) fn new(name: &'a str, attributes: &[(&'a str, &'a str)]) -> Self {
            Self {
                name,
                attributes: attributes.to_vec(),
                parent: None,
            }
        }

        pub(crate) fn child(self, name: &'a str, attributes: &[(&'a str, &'a str)]) -> Self {
            Self {
                parent: Some(Box::new(self)),
                ..Self::new(name, attributes)
            }
        }
    }

    impl SelectorElement for TestElement<'_> {
        fn local_name(&self) -> &str {
            self.name
        }

        fn attribute(&self, name: &str) -> Option<&str> {
            self.attributes
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| *value)
        }

        fn parent(&self) -> Option<Self> {
            self.parent.as_deref().cloned()
        }
    }

    fn matches(selector: &str, element: &TestElement<'_>) -> bool {
        Selector::parse(selector).unwrap().matches(element)
    }

    #[test]
    fn test_simple_selectors() {
        let element = TestElement::new("quantity", &[("id", "q1"), ("class", "ion sodium")]);

        assert!(matches("quantity", &element));
        assert!(matches("*", &element));
        assert!(matches("#q1", &element));
        assert!(matches(".sodium", &element));
        assert!(matches("quantity.ion.sodium#q1", &element));
        assert!(!matches("compartment", &element));
        assert!(!matches(".potassium", &element));
        assert!(!matches("quantity#q2", &element));
    }

    #[test]
    fn test_attribute_operators() {
        let element = TestElement::new(
            "flow",
            &[("transporter", "na-k-pump"), ("to", "p2 p3"), ("lang", "en-GB")],
        );

        assert!(matches("[transporter]", &element));
        assert!(matches("[transporter=na-k-pump]", &element));
        assert!(matches("[transporter=\"na-k-pump\"]", &element));
        assert!(matches("[to~=p3]", &element));
        assert!(matches("[lang|=en]", &element));
        assert!(matches("[transporter^=na]", &element));
        assert!(matches("[transporter$='pump']", &element));
        assert!(matches("[transporter*=k]", &element));
        assert!(matches("[ to ~= p2 ]", &element));

        assert!(!matches("[from]", &element));
        assert!(!matches("[to=p3]", &element));
        assert!(!matches("[lang|=e]", &element));
        assert!(!matches("[transporter^='']", &element));
    }

    #[test]
    fn test_combinators() {
        let quantity = TestElement::new("diagram", &[])
            .child("compartment", &[("id", "outer")])
            .child("compartment", &[("id", "inner")])
            .child("quantity", &[("id", "q1")]);

        assert!(matches("compartment quantity", &quantity));
        assert!(matches("#outer quantity", &quantity));
        assert!(matches("#inner > quantity", &quantity));
        assert!(matches("diagram compartment > quantity", &quantity));
        assert!(matches("#outer>#inner>#q1", &quantity));
        assert!(!matches("#outer > quantity", &quantity));
        assert!(!matches("bond-graph quantity", &quantity));
    }

    #[test]
    fn test_malformed_selectors() {
        let err = Selector::parse("quantity:hover").unwrap_err();
        assert_eq!(err.offset(), 8);
        assert!(err.reason().contains("pseudo-classes"));

        let err = Selector::parse("quantity::before").unwrap_err();
        assert_eq!(err.offset(), 8);

        assert!(Selector::parse("").is_err());
        assert!(Selector::parse("[attr").is_err());
        assert!(Selector::parse("a >").is_err());
        assert!(Selector::parse(".").is_err());
        assert!(Selector::parse("a + b").is_err());
    }

    #[test]
    fn test_selector_trims_text() {
        let selector = Selector::parse("  compartment   quantity ").unwrap();
        assert_eq!(selector.as_str(), "compartment   quantity");
    }
}
