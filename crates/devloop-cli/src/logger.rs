//! Logging infrastructure for the devloop CLI.
//!
//! Structured logging is built on the `tracing` ecosystem. Operator-facing
//! status lines go through [`crate::ui`]; `tracing` carries the internal
//! detail (event routing, single-flight drops, channel pruning) that is only
//! interesting with `--verbose` or `RUST_LOG`.
//!
//! # Example
//!
//! ```rust,no_run
//! use devloop_cli::logger::init_logger;
//! use tracing::{debug, info};
//!
//! init_logger(false, false, false);
//!
//! info!("Starting dev server");
//! debug!("Routing change: {}", "demo/src/main.ts");
//! ```

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const VERBOSE_FILTER: &str = "devloop_cli=debug";
const QUIET_FILTER: &str = "devloop_cli=error";
const DEFAULT_FILTER: &str = "devloop_cli=info";

/// Initialize the tracing subscriber with the specified options.
///
/// Should be called once at the start of the program, before any logging occurs.
///
/// # Verbosity Levels
///
/// 1. `--verbose` flag: DEBUG for devloop
/// 2. `--quiet` flag: ERROR only
/// 3. `RUST_LOG` environment variable: custom filter
/// 4. Default: INFO for devloop
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let filter = if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    };

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color && crate::ui::should_use_color())
        .compact();

    // try_init: integration tests may install a subscriber more than once
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
