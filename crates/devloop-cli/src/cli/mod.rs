//! Command-line interface definition for devloop.
//!
//! This module defines the CLI structure using clap v4's derive macros.
//!
//! # Command Structure
//!
//! - `devloop dev` - Serve the site, rebuild on change, push reloads
//! - `devloop check` - Validate configuration and toolchains without serving

mod commands;

use clap::Parser;

pub use commands::{CheckArgs, Command, DevArgs, ProjectArgs};

/// devloop - live-reloading dev server for wasm + script web apps
#[derive(Parser, Debug)]
#[command(
    name = "devloop",
    version,
    about = "Live-reloading dev server for wasm + script web apps",
    long_about = "devloop serves a single-page app, rebuilds its wasm module and script bundle\n\
                  when their sources change, and reloads connected browser tabs once a\n\
                  rebuild succeeds."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    ///
    /// Shows change routing, single-flight decisions and client
    /// connect/disconnect events.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    ///
    /// Outputs plain text without ANSI color codes. Useful for logging to
    /// files or systems that don't support colored terminal output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
