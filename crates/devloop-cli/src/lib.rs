//! devloop - live-reloading dev server for wasm + script web apps.
//!
//! Serves a single-page app, watches its sources, rebuilds the wasm module
//! (through `wasm-pack`) and the script bundle (through `esbuild`) when they
//! change, and tells every open tab to reload once a rebuild succeeds.
//!
//! # Architecture
//!
//! - [`cli`] - Argument definitions
//! - [`commands`] - `dev` and `check` implementations
//! - [`config`] - Layered `devloop.toml` / environment / flag configuration
//! - [`dev`] - Build pipelines, watcher, reload broadcaster and HTTP server
//! - [`error`] - Error types with actionable messages
//! - [`logger`] - Structured logging with tracing
//! - [`ui`] - Terminal status lines
//!
//! # Example
//!
//! ```rust,no_run
//! use devloop_cli::{error::Result, logger};
//!
//! fn main() -> Result<()> {
//!     logger::init_logger(false, false, false);
//!     // CLI command implementations...
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod dev;
pub mod error;
pub mod logger;
pub mod ui;

// Re-export commonly used types
pub use config::DevloopConfig;
pub use error::{BuildError, CliError, ConfigError, Result, ResultExt};
