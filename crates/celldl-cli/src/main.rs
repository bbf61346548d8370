//! CellDL CLI entry point.

use std::{process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info, warn};
use miette::{Diagnostic as _, GraphicalReportHandler, Severity};

use celldl::CellDlError;
use celldl_cli::{Args, error_adapter::to_reportables};

/// Exit status for a document or stylesheet that failed validation.
const EXIT_INVALID_DOCUMENT: i32 = 1;
/// Exit status for unreadable input, bad configuration or a failed export.
const EXIT_FAILURE: i32 = 2;

fn main() {
    miette::set_panic_hook();

    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!(log_level:?; "Starting CellDL");
    debug!(args:?; "Parsed arguments");

    if let Err(err) = celldl_cli::run(&args) {
        report(&err);
        process::exit(exit_code(&err));
    }

    info!(output = args.output; "Diagram model written");
}

/// Render every diagnostic of `err`, logging warnings below errors.
fn report(err: &CellDlError) {
    let reporter = GraphicalReportHandler::new();
    let reportables = to_reportables(err);
    let errors = reportables
        .iter()
        .filter(|reportable| reportable.severity() != Some(Severity::Warning))
        .count();

    for reportable in &reportables {
        let mut writer = String::new();
        reporter
            .render_report(&mut writer, reportable)
            .expect("Writing to String buffer is infallible");

        match reportable.severity() {
            Some(Severity::Warning) => warn!("{writer}"),
            _ => error!("{writer}"),
        }
    }
    error!(errors, warnings = reportables.len() - errors; "CellDL document rejected");
}

fn exit_code(err: &CellDlError) -> i32 {
    match err {
        CellDlError::Parse { .. } => EXIT_INVALID_DOCUMENT,
        CellDlError::Io(_) | CellDlError::Config(_) | CellDlError::Export(_) => EXIT_FAILURE,
    }
}
