//! Miette diagnostic conversion for CLI errors.

use crate::error::{BuildError, CliError};
use miette::Report;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Build(e) => build_error_to_miette(e),
        CliError::Config(e) => miette::miette!("Configuration error: {}", e),
        CliError::Watch(e) => miette::miette!(
            "File watcher error: {}\n\nHint: Run with --no-watch to serve without rebuilding",
            e
        ),
        _ => miette::miette!("{}", err),
    }
}

/// Convert BuildError to miette Report
fn build_error_to_miette(err: BuildError) -> Report {
    match err {
        BuildError::Failed {
            pipeline,
            diagnostics,
        } => miette::miette!("The {} pipeline failed:\n\n{}", pipeline, diagnostics.trim()),
        _ => miette::miette!("{}", err),
    }
}
