//! CellDL - Cell diagrams with bond-graph semantics
//!
//! This library loads CellDL documents into a validated, styled diagram
//! model. Styles come from user stylesheets and the document's own
//! `<style>` elements through a CSS cascade; the bond graph is checked
//! against the compartments its potentials live in. The model can be
//! exported as JSON.

pub mod config;

mod error;
mod loader;

pub use celldl_core::{color, identifier, semantic, style};

pub use error::CellDlError;
pub use loader::FileLoader;

use std::{fs, path::Path, sync::Arc};

use log::{debug, info, trace};

use celldl_parser::{ParseConfig, css::Stylesheet};

use config::AppConfig;

/// Builder for parsing and exporting CellDL diagrams.
///
/// # Examples
///
/// ```rust,no_run
/// use celldl::{DiagramBuilder, config::AppConfig};
///
/// let builder = DiagramBuilder::new(AppConfig::default());
///
/// // Parse a document, resolving its external stylesheets next to it
/// let diagram = builder.parse_file("cell.celldl")
///     .expect("Failed to parse");
///
/// // Export the semantic model
/// let json = builder.to_json(&diagram)
///     .expect("Failed to export");
///
/// // Or use default config
/// let builder = DiagramBuilder::default();
/// ```
#[derive(Debug, Default)]
pub struct DiagramBuilder {
    config: AppConfig,
}

impl DiagramBuilder {
    /// Create a new diagram builder with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration including the user stylesheets
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse document text into a semantic diagram.
    ///
    /// External stylesheet references are resolved against the current
    /// working directory.
    ///
    /// # Errors
    ///
    /// Returns `CellDlError` if a user stylesheet cannot be read or parsed,
    /// or if the document is invalid.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use celldl::DiagramBuilder;
    ///
    /// let source = r#"<cell-diagram><diagram><quantity id="q1"/></diagram></cell-diagram>"#;
    /// let diagram = DiagramBuilder::default()
    ///     .parse(source)
    ///     .expect("Failed to parse diagram");
    /// assert_eq!(diagram.quantities().count(), 1);
    /// ```
    pub fn parse(&self, source: &str) -> Result<semantic::Diagram, CellDlError> {
        self.parse_in(source, Path::new("."))
    }

    /// Read and parse the document at `path`.
    ///
    /// External stylesheet references are resolved relative to the
    /// document's directory.
    ///
    /// # Errors
    ///
    /// Returns `CellDlError::Io` if the document cannot be read, otherwise
    /// the errors of [`DiagramBuilder::parse`].
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<semantic::Diagram, CellDlError> {
        let path = path.as_ref();
        info!(path:? = path; "Reading document");
        let source = fs::read_to_string(path)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        self.parse_in(&source, base)
    }

    /// Serialize a diagram as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns `CellDlError::Export` if serialization fails.
    pub fn to_json(&self, diagram: &semantic::Diagram) -> Result<String, CellDlError> {
        info!("Exporting diagram as JSON");
        let json = serde_json::to_string_pretty(diagram)?;
        debug!(bytes = json.len(); "Diagram exported");
        Ok(json)
    }

    fn parse_in(&self, source: &str, base: &Path) -> Result<semantic::Diagram, CellDlError> {
        let config = self.parse_config(base)?;
        debug!(config:?; "Parsing document");
        let diagram = celldl_parser::parse(source, &config)
            .map_err(|err| CellDlError::new_parse_error(err, source))?;
        trace!(diagram:?; "Parsed diagram");
        Ok(diagram)
    }

    /// The parser configuration: user stylesheets and, if enabled, a file loader rooted at `base`.
    fn parse_config(&self, base: &Path) -> Result<ParseConfig, CellDlError> {
        let mut config = ParseConfig::new();
        for path in &self.config.stylesheets.default {
            debug!(path:? = path; "Loading user stylesheet");
            let css = fs::read_to_string(path).map_err(|err| {
                CellDlError::Config(format!(
                    "cannot read stylesheet `{}`: {err}",
                    path.display()
                ))
            })?;
            let sheet =
                Stylesheet::parse(&css).map_err(|err| CellDlError::new_parse_error(err, &css))?;
            config = config.with_stylesheet(Arc::new(sheet));
        }
        if self.config.stylesheets.load_external {
            config = config.with_loader(FileLoader::new(base));
        }
        Ok(config)
    }
}
