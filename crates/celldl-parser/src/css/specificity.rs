//! Selector specificity.

use std::{fmt, ops::Add, str::FromStr};

use crate::css::selector::{Selector, SelectorError};

/// The specificity of a selector as `(ids, classes and attributes, types)`.
///
/// Specificities compare lexicographically, so one id outweighs any number
/// of classes. The universal selector contributes nothing.
///
/// # Examples
///
/// ```
/// use celldl_parser::css::Specificity;
///
/// let id: Specificity = "#q1".parse().unwrap();
/// let classes: Specificity = "quantity.ion.sodium".parse().unwrap();
///
/// assert_eq!(classes, Specificity::new(0, 2, 1));
/// assert!(id > classes);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Specificity {
    ids: usize,
    classes: usize,
    types: usize,
}

impl Specificity {
    pub fn new(ids: usize, classes: usize, types: usize) -> Self {
        Self {
            ids,
            classes,
            types,
        }
    }

    pub fn ids(&self) -> usize {
        self.ids
    }

    /// Class and attribute selectors.
    pub fn classes(&self) -> usize {
        self.classes
    }

    pub fn types(&self) -> usize {
        self.types
    }
}

impl Add for Specificity {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(
            self.ids + other.ids,
            self.classes + other.classes,
            self.types + other.types,
        )
    }
}

impl FromStr for Specificity {
    type Err = SelectorError;

    fn from_str(selector: &str) -> Result<Self, Self::Err> {
        Selector::parse(selector).map(|selector| selector.specificity())
    }
}

impl fmt::Display for Specificity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.ids, self.classes, self.types)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specificity(selector: &str) -> Specificity {
        selector.parse().unwrap()
    }

    #[test]
    fn test_specificity_counts() {
        assert_eq!(specificity("*"), Specificity::new(0, 0, 0));
        assert_eq!(specificity("quantity"), Specificity::new(0, 0, 1));
        assert_eq!(specificity(".ion"), Specificity::new(0, 1, 0));
        assert_eq!(specificity("[name]"), Specificity::new(0, 1, 0));
        assert_eq!(specificity("#q1"), Specificity::new(1, 0, 0));
        assert_eq!(
            specificity("compartment#c1 > quantity.ion[name^=Na]"),
            Specificity::new(1, 2, 2)
        );
    }

    #[test]
    fn test_specificity_order_is_lexicographic() {
        assert!(specificity("#a") > specificity(".a.b.c.d.e.f.g.h.i.j.k"));
        assert!(specificity(".a") > specificity("a b c d e f"));
        assert!(specificity("a.b") > specificity(".b"));
        assert_eq!(specificity("a .b"), specificity("a.b"));
    }

    #[test]
    fn test_malformed_selector() {
        assert!("a:first-child".parse::<Specificity>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Specificity::new(1, 2, 3).to_string(), "(1, 2, 3)");
    }
}
