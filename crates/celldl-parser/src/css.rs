//! The style cascade.
//!
//! A [`Stylesheet`] is parsed once from CSS text into rules sorted by
//! `(specificity, order)`. A [`StylesheetSet`] orders several sheets, and
//! the resolved style of an element is the merge of every matching rule in
//! that order. Only selector matching, specificity and declaration merging
//! are implemented: there is no inheritance, `!important` or pseudo-class
//! support.

mod selector;
mod specificity;
mod stylesheet;
mod stylesheet_set;

pub use selector::{AttributeOperator, Selector, SelectorElement, SelectorError};
pub use specificity::Specificity;
pub use stylesheet::{StyleRule, Stylesheet};
pub use stylesheet_set::StylesheetSet;
