//! Ordered sets of stylesheets.

use std::sync::Arc;

use celldl_core::style::Style;

use crate::css::{selector::SelectorElement, stylesheet::Stylesheet};

/// Stylesheets in precedence order, lowest first.
///
/// The style of an element is the left-to-right merge of each sheet's
/// style, so a later sheet overrides an earlier one even when the earlier
/// sheet's rule is more specific.
#[derive(Debug, Clone, Default)]
pub struct StylesheetSet {
    sheets: Vec<Arc<Stylesheet>>,
}

impl StylesheetSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stylesheet with higher precedence than every sheet already in the set.
    pub fn push(&mut self, sheet: Arc<Stylesheet>) {
        self.sheets.push(sheet);
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Stylesheet> {
        self.sheets.iter().map(Arc::as_ref)
    }

    /// Resolve the style of `element` across every sheet.
    pub fn style<E: SelectorElement>(&self, element: &E) -> Style {
        self.sheets.iter().fold(Style::new(), |mut style, sheet| {
            style.apply(&sheet.style(element));
            style
        })
    }
}

impl FromIterator<Arc<Stylesheet>> for StylesheetSet {
    fn from_iter<T: IntoIterator<Item = Arc<Stylesheet>>>(iter: T) -> Self {
        Self {
            sheets: iter.into_iter().collect(),
        }
    }
}
