//! Resolved style declarations.
//!
//! A [`Style`] is the effective set of `property: value` declarations for one
//! document element after the cascade has run. Property order follows the
//! order in which properties were first declared, which keeps serialized
//! output stable.
//!
//! Values are kept as the raw declaration text. Typed accessors such as
//! [`Style::colour`] and [`Style::number`] interpret them on demand.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

use crate::color::Color;

/// Default element colour when no `color` property is declared.
pub const DEFAULT_COLOUR: &str = "#808080";

/// Default text colour when no `text-color` property is declared.
pub const DEFAULT_TEXT_COLOUR: &str = "#202020";

/// Errors raised when a style value cannot be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StyleValueError {
    #[error("invalid number `{value}` for property `{property}`")]
    InvalidNumber { property: String, value: String },

    #[error("invalid colour `{value}` for property `{property}`")]
    InvalidColour { property: String, value: String },
}

/// An ordered map of resolved style declarations.
///
/// # Examples
///
/// ```
/// use celldl_core::style::Style;
///
/// let base: Style = [("color", "red"), ("stroke", "black")].into_iter().collect();
/// let over: Style = [("color", "blue")].into_iter().collect();
///
/// let merged = base.merged(&over);
/// assert_eq!(merged.get("color"), Some("blue"));
/// assert_eq!(merged.get("stroke"), Some("black"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Style {
    declarations: IndexMap<String, String>,
}

impl Style {
    /// Create an empty style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the raw value of a property.
    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations.get(property).map(String::as_str)
    }

    /// Check whether a property is declared.
    pub fn contains(&self, property: &str) -> bool {
        self.declarations.contains_key(property)
    }

    /// Number of declared properties.
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    /// Check whether no property is declared.
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Iterate over `(property, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.declarations
            .iter()
            .map(|(property, value)| (property.as_str(), value.as_str()))
    }

    /// Declare a property, replacing any previous value.
    pub fn set(&mut self, property: impl Into<String>, value: impl Into<String>) {
        self.declarations.insert(property.into(), value.into());
    }

    /// Apply every declaration of `other` on top of this style.
    pub fn apply(&mut self, other: &Style) {
        for (property, value) in &other.declarations {
            self.declarations.insert(property.clone(), value.clone());
        }
    }

    /// Return a new style where declarations from `other` override this one.
    pub fn merged(&self, other: &Style) -> Style {
        let mut style = self.clone();
        style.apply(other);
        style
    }

    /// Parse a numeric property, returning `None` when it is not declared.
    ///
    /// A trailing `px` unit is accepted.
    ///
    /// # Errors
    ///
    /// Returns [`StyleValueError::InvalidNumber`] if the value is not a number.
    pub fn number(&self, property: &str) -> Result<Option<f32>, StyleValueError> {
        self.get(property)
            .map(|value| {
                let number = value.trim();
                number
                    .strip_suffix("px")
                    .unwrap_or(number)
                    .trim_end()
                    .parse::<f32>()
                    .map_err(|_| StyleValueError::InvalidNumber {
                        property: property.to_string(),
                        value: value.to_string(),
                    })
            })
            .transpose()
    }

    /// The element colour from the `color` property, or the default grey.
    ///
    /// # Errors
    ///
    /// Returns [`StyleValueError::InvalidColour`] if the value is not a CSS colour.
    pub fn colour(&self) -> Result<Color, StyleValueError> {
        self.colour_property("color", DEFAULT_COLOUR)
    }

    /// The text colour from the `text-color` property, or the default dark grey.
    ///
    /// # Errors
    ///
    /// Returns [`StyleValueError::InvalidColour`] if the value is not a CSS colour.
    pub fn text_colour(&self) -> Result<Color, StyleValueError> {
        self.colour_property("text-color", DEFAULT_TEXT_COLOUR)
    }

    /// The `stroke` property, `none` when absent.
    pub fn stroke(&self) -> &str {
        self.get("stroke").unwrap_or("none")
    }

    /// The `stroke-width` property, `1` when absent.
    pub fn stroke_width(&self) -> &str {
        self.get("stroke-width").unwrap_or("1")
    }

    fn colour_property(&self, property: &str, default: &str) -> Result<Color, StyleValueError> {
        let value = self.get(property).unwrap_or(default);
        Color::new(value.trim()).map_err(|_| StyleValueError::InvalidColour {
            property: property.to_string(),
            value: value.to_string(),
        })
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Style {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            declarations: iter
                .into_iter()
                .map(|(property, value)| (property.into(), value.into()))
                .collect(),
        }
    }
}

impl fmt::Display for Style {
    /// Formats one `property: value;` declaration per line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (property, value)) in self.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{property}: {value};")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_first_declaration_position() {
        let base: Style = [("a", "1"), ("b", "2")].into_iter().collect();
        let over: Style = [("b", "3"), ("a", "4")].into_iter().collect();

        let merged = base.merged(&over);
        let pairs: Vec<_> = merged.iter().collect();
        assert_eq!(pairs, vec![("a", "4"), ("b", "3")]);

        // The receiver is untouched
        assert_eq!(base.get("a"), Some("1"));
    }

    #[test]
    fn test_number() {
        let style: Style = [("width", " 640 "), ("height", "tall"), ("depth", "12.5px")]
            .into_iter()
            .collect();

        assert_eq!(style.number("width"), Ok(Some(640.0)));
        assert_eq!(style.number("depth"), Ok(Some(12.5)));
        assert_eq!(style.number("breadth"), Ok(None));
        assert!(matches!(
            style.number("height"),
            Err(StyleValueError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_colour_defaults() {
        let style = Style::new();
        assert_eq!(style.colour().unwrap(), Color::new(DEFAULT_COLOUR).unwrap());
        assert_eq!(
            style.text_colour().unwrap(),
            Color::new(DEFAULT_TEXT_COLOUR).unwrap()
        );
        assert_eq!(style.stroke(), "none");
        assert_eq!(style.stroke_width(), "1");
    }

    #[test]
    fn test_invalid_colour() {
        let style: Style = [("color", "blurple")].into_iter().collect();
        assert_eq!(
            style.colour(),
            Err(StyleValueError::InvalidColour {
                property: "color".to_string(),
                value: "blurple".to_string(),
            })
        );
    }

    #[test]
    fn test_display() {
        let style: Style = [("color", "red"), ("stroke-width", "2")].into_iter().collect();
        assert_eq!(style.to_string(), "color: red;\nstroke-width: 2;");
        assert_eq!(Style::new().to_string(), "");
    }
}
