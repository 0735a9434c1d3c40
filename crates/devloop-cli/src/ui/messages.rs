//! Status message functions for terminal output.

use owo_colors::{OwoColorize, Stream, Style};

fn paint(text: &str, style: Style) -> String {
    text.if_supports_color(Stream::Stderr, |t| t.style(style))
        .to_string()
}

/// Print a success message to stderr.
///
/// ```no_run
/// use devloop_cli::ui::success;
///
/// success("script build finished in 84ms");
/// ```
pub fn success(message: &str) {
    eprintln!("{} {}", paint("✓", Style::new().green().bold()), message);
}

/// Print an info message to stderr.
pub fn info(message: &str) {
    eprintln!("{} {}", paint("ℹ", Style::new().blue().bold()), message);
}

/// Print a warning message to stderr.
pub fn warning(message: &str) {
    eprintln!(
        "{} {}",
        paint("⚠", Style::new().yellow().bold()),
        paint(message, Style::new().yellow())
    );
}

/// Print an error message to stderr.
pub fn error(message: &str) {
    eprintln!(
        "{} {}",
        paint("✗", Style::new().red().bold()),
        paint(message, Style::new().red())
    );
}

/// Print captured toolchain output, indented under the preceding status line.
///
/// Blank lines are dropped so compiler output with trailing padding stays compact.
pub fn diagnostics(text: &str) {
    for line in text.lines().filter(|line| !line.trim().is_empty()) {
        eprintln!("    {}", paint(line, Style::new().dimmed()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_messages() {
        success("Success message");
        info("Info message");
        warning("Warning message");
        error("Error message");
        diagnostics("error[E0425]: cannot find value `x`\n\n  --> src/lib.rs:3:5\n");
    }
}
