//! Command-line argument definitions for the CellDL CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, configuration file
//! selection, extra user stylesheets and logging verbosity.

use clap::Parser;

/// Command-line arguments for the CellDL diagram tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input CellDL document
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Path to the output JSON file
    #[arg(short, long, default_value = "out.json")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// User stylesheet applied before the document's own stylesheets (repeatable)
    #[arg(long = "stylesheet", value_name = "CSS")]
    pub stylesheets: Vec<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
