//! Application configuration.

use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Stylesheet configuration section
    #[serde(default)]
    pub stylesheets: StylesheetConfig,
}

/// Stylesheet configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct StylesheetConfig {
    /// User stylesheets applied to every document, lowest precedence first
    #[serde(default)]
    pub default: Vec<PathBuf>,

    /// Whether `<style href="...">` references are resolved
    #[serde(default = "default_load_external")]
    pub load_external: bool,
}

impl Default for StylesheetConfig {
    fn default() -> Self {
        Self {
            default: Vec::new(),
            load_external: default_load_external(),
        }
    }
}

fn default_load_external() -> bool {
    true
}
