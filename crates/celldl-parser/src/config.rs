//! Configuration for a parse.

use std::{fmt, io, sync::Arc};

use crate::css::Stylesheet;

/// Resolves external stylesheet references (`<style href="...">`) to CSS text.
///
/// Implementations decide how references are interpreted. The `celldl`
/// crate provides one that reads files relative to the document.
pub trait StylesheetLoader: Send + Sync {
    /// Load the CSS text for `reference`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the stylesheet cannot be read.
    fn load(&self, reference: &str) -> io::Result<String>;
}

/// Configuration for [`parse`](crate::parse).
///
/// User stylesheets have the lowest precedence: they are applied before
/// every stylesheet declared by the document itself.
#[derive(Clone, Default)]
pub struct ParseConfig {
    stylesheets: Vec<Arc<Stylesheet>>,
    loader: Option<Arc<dyn StylesheetLoader>>,
}

impl ParseConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user stylesheet after the ones already configured.
    pub fn with_stylesheet(mut self, stylesheet: impl Into<Arc<Stylesheet>>) -> Self {
        self.stylesheets.push(stylesheet.into());
        self
    }

    /// Set the loader used to resolve external stylesheet references.
    ///
    /// Without a loader, external references are skipped with a warning.
    pub fn with_loader(mut self, loader: impl StylesheetLoader + 'static) -> Self {
        self.loader = Some(Arc::new(loader));
        self
    }

    /// User stylesheets in precedence order.
    pub fn stylesheets(&self) -> &[Arc<Stylesheet>] {
        &self.stylesheets
    }

    pub fn loader(&self) -> Option<&dyn StylesheetLoader> {
        self.loader.as_deref()
    }
}

impl fmt::Debug for ParseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseConfig")
            .field("stylesheets", &self.stylesheets.len())
            .field("loader", &self.loader.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoLoader;

    impl StylesheetLoader for NoLoader {
        fn load(&self, reference: &str) -> io::Result<String> {
            Err(io::Error::new(io::ErrorKind::NotFound, reference.to_string()))
        }
    }

    #[test]
    fn test_config_builder() {
        let config = ParseConfig::new()
            .with_stylesheet(Stylesheet::parse("quantity { color: red }").unwrap())
            .with_loader(NoLoader);

        assert_eq!(config.stylesheets().len(), 1);
        assert!(config.loader().is_some());
        assert_eq!(
            format!("{config:?}"),
            "ParseConfig { stylesheets: 1, loader: true }"
        );
    }
}
