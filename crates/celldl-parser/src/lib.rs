//! # CellDL Parser
//!
//! Parser for CellDL cell diagrams. This crate provides the pipeline from
//! document text to the validated semantic model: stylesheet loading and the
//! CSS cascade, followed by the structural walk that builds the diagram and
//! its bond graph.
//!
//! ## Usage
//!
//! ```
//! # use celldl_parser::{parse, ParseConfig, ParseError};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = r#"
//!         <cell-diagram>
//!           <style>.membrane { color: #00f }</style>
//!           <diagram>
//!             <compartment id="cell" class="membrane">
//!               <quantity id="na_i"/>
//!             </compartment>
//!           </diagram>
//!         </cell-diagram>
//!     "#;
//!
//!     let diagram = parse(source, &ParseConfig::default())?;
//!     assert_eq!(diagram.compartments().count(), 1);
//!     Ok(())
//! }
//! ```

mod cascade;
mod config;
pub mod css;
mod diagnostics;
pub mod document;
mod elaborate;
mod elaborate_utils;
pub mod error;
mod span;

pub use config::{ParseConfig, StylesheetLoader};
pub use document::Element;
pub use error::ParseError;
pub use span::Span;

use log::info;

use celldl_core::semantic::Diagram;

use elaborate::Builder;

/// Parse a CellDL document into a semantic diagram.
///
/// This is the main entry point of the crate. It runs the complete
/// pipeline:
///
/// 1. **Load** - Parse the XML and check the root element
/// 2. **Cascade** - Assemble the stylesheet set from the configured user
///    stylesheets and the document's external and inline `style` elements
/// 3. **Elaborate** - Walk the document, resolving each element's style and
///    building the diagram and its bond graph
///
/// Nothing is returned until the whole document has been validated.
///
/// # Arguments
///
/// * `source` - The CellDL document text
/// * `config` - User stylesheets and the loader for external stylesheets
///
/// # Errors
///
/// Returns a [`ParseError`] when the document is malformed, a stylesheet
/// cannot be parsed or loaded, or the structure or references of the
/// document are invalid. Structural diagnostics carry the context of the
/// element that failed.
pub fn parse(source: &str, config: &ParseConfig) -> Result<Diagram, ParseError> {
    info!(bytes = source.len(); "Parsing CellDL document");

    // Step 1: Load
    let document = document::load(source)?;
    let root = document.root_element();

    // Step 2: Cascade
    let stylesheets = cascade::stylesheets(root, config)?;

    // Step 3: Elaborate
    Builder::new(&stylesheets).build(root)
}
