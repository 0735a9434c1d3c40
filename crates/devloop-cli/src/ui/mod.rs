//! Terminal UI utilities for formatted operator output.
//!
//! Everything here writes to stderr so stdout stays free for piping.
//!
//! ```no_run
//! use devloop_cli::ui;
//!
//! ui::init_colors(false);
//! ui::info("Watching demo/src");
//! ui::success("native build finished in 4.12s");
//! ui::error("script build failed");
//! ```

mod format;
mod messages;

pub use format::format_duration;
pub use messages::{diagnostics, error, info, success, warning};

/// Check if color output should be enabled.
///
/// Respects NO_COLOR and FORCE_COLOR environment variables, falls back to
/// terminal capability detection on stderr. Shared by the logger and the
/// status lines so both agree.
pub fn should_use_color() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    let term = console::Term::stderr();
    term.is_term() && term.features().colors_supported()
}

/// Initialize color support based on environment.
///
/// `owo-colors` only emits ANSI codes when asked to, so this turns them off
/// globally for `--no-color` or a non-terminal stderr.
pub fn init_colors(no_color: bool) {
    if no_color || !should_use_color() {
        owo_colors::set_override(false);
    }
}
