//! Error handling for the devloop CLI.
//!
//! This module provides a hierarchical error type system using `thiserror`.
//! Each variant is meant to be actionable: it names what failed and, where it
//! helps, how to fix it.
//!
//! # Architecture
//!
//! - **Top-level errors** (`CliError`) represent broad categories of failures
//! - **Domain-specific errors** (`ConfigError`, `BuildError`) provide detailed context
//! - **Error conversion** is automatic via `#[from]` attributes
//!
//! Build failures are deliberately *not* fatal to the server. The build
//! coordinator records them and reports them to the operator; `BuildError`
//! only escapes as an `Err` from the `check` command and from pipeline spawns.

mod miette;

pub use self::miette::cli_error_to_miette;

use std::path::PathBuf;
use thiserror::Error;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration-related errors (bad values, unreadable files, etc.)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// External build pipeline errors
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// File or directory not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Development server errors
    #[error("Server error: {0}")]
    Server(String),

    /// File watching errors
    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),

    /// Generic errors with custom messages
    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Explicitly requested config file doesn't exist
    #[error("Config file not found: {}\n\nHint: Create a devloop.toml file or drop the --config flag", .0.display())]
    NotFound(PathBuf),

    /// Layered configuration could not be extracted
    #[error("Failed to load configuration: {0}\n\nHint: Check devloop.toml syntax and DEVLOOP_* environment variables")]
    Extract(String),

    /// Missing required configuration field
    #[error("Missing required field: {field}\n\nHint: {hint}")]
    MissingField {
        /// Name of the missing field
        field: String,
        /// Helpful hint for providing the field
        hint: String,
    },

    /// Invalid value for a configuration option
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The invalid value
        value: String,
        /// Helpful hint for correct values
        hint: String,
    },
}

/// External build pipeline errors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The toolchain executable could not be started
    #[error("Failed to run `{program}`: {source}\n\nHint: Make sure `{program}` is installed and on your PATH")]
    Spawn {
        /// Program that failed to start
        program: String,
        /// Underlying spawn error
        #[source]
        source: std::io::Error,
    },

    /// The toolchain ran but reported failure
    #[error("{pipeline} build failed:\n{diagnostics}")]
    Failed {
        /// Pipeline label ("native" or "script")
        pipeline: String,
        /// Captured compiler or bundler output
        diagnostics: String,
    },
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Extension trait for adding context to `Result` types.
pub trait ResultExt<T> {
    /// Turn a not-found I/O error into [`CliError::FileNotFound`] for `path`.
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;

    /// Prefix the error with a custom message.
    fn context(self, msg: impl std::fmt::Display) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            match err {
                CliError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                    CliError::FileNotFound(path.as_ref().to_path_buf())
                }
                other => other,
            }
        })
    }

    fn context(self, msg: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}: {}", msg, err))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_not_found() {
        let err = ConfigError::NotFound(PathBuf::from("devloop.toml"));
        let msg = err.to_string();
        assert!(msg.contains("Config file not found"));
        assert!(msg.contains("devloop.toml"));
        assert!(msg.contains("Hint:"));
    }

    #[test]
    fn test_config_error_invalid_value() {
        let err = ConfigError::InvalidValue {
            field: "server.port".to_string(),
            value: "0".to_string(),
            hint: "Pick a port between 1 and 65535".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Invalid value for 'server.port'"));
        assert!(msg.contains("Pick a port"));
    }

    #[test]
    fn test_build_error_spawn_names_program() {
        let err = BuildError::Spawn {
            program: "wasm-pack".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to run `wasm-pack`"));
        assert!(msg.contains("on your PATH"));
    }

    #[test]
    fn test_build_error_failed_includes_diagnostics() {
        let err = BuildError::Failed {
            pipeline: "script".to_string(),
            diagnostics: "✘ [ERROR] Could not resolve \"./missing\"".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("script build failed"));
        assert!(msg.contains("Could not resolve"));
    }

    #[test]
    fn test_cli_error_from_config_error() {
        let config_err = ConfigError::NotFound(PathBuf::from("test.toml"));
        let cli_err: CliError = config_err.into();
        assert!(matches!(cli_err, CliError::Config(_)));
    }

    #[test]
    fn test_result_ext_with_path() {
        let result: std::io::Result<()> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file not found",
        ));

        let err = result.with_path("/test/index.html").unwrap_err();
        assert!(matches!(err, CliError::FileNotFound(_)));
    }

    #[test]
    fn test_result_ext_context() {
        let result: std::result::Result<(), ConfigError> =
            Err(ConfigError::NotFound(PathBuf::from("test.toml")));

        let err = result.context("Failed to initialize").unwrap_err();
        assert!(err.to_string().starts_with("Failed to initialize:"));
    }
}
