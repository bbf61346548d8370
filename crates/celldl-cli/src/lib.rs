//! CellDL CLI library
//!
//! This module contains the core CLI logic for the CellDL diagram tool.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::{fs, path::PathBuf};

use log::info;

use celldl::{CellDlError, DiagramBuilder};

/// Run the CellDL CLI application
///
/// This function parses and validates the input document, applying the
/// configured and command-line user stylesheets, and writes the resulting
/// diagram model as JSON to the output file.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `CellDlError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Stylesheet and document errors
/// - Export errors
pub fn run(args: &Args) -> Result<(), CellDlError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing diagram"
    );

    // Load configuration
    let mut app_config = config::load_config(args.config.as_ref())?;
    app_config
        .stylesheets
        .default
        .extend(args.stylesheets.iter().map(PathBuf::from));

    // Process diagram using DiagramBuilder API
    let builder = DiagramBuilder::new(app_config);
    let diagram = builder.parse_file(&args.input)?;
    let json = builder.to_json(&diagram)?;

    // Write output file
    fs::write(&args.output, json)?;

    info!(
        output_file = args.output,
        compartments = diagram.compartments().count(),
        flows = diagram.bond_graph().flows().count();
        "Diagram exported successfully"
    );

    Ok(())
}
