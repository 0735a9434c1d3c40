//! External build pipelines.
//!
//! A [`Pipeline`] is anything that can "run the whole build once and say how
//! it went". The dev server only ever talks to this trait, so tests swap in
//! fakes instead of spawning real toolchains.

use crate::config::{DevloopConfig, NativeConfig, ScriptConfig};
use crate::error::BuildError;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use tokio::process::Command;

/// Result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutcome {
    pub success: bool,
    /// Captured tool output worth showing the operator (empty on a clean run)
    pub diagnostics: String,
}

impl PipelineOutcome {
    pub fn success() -> Self {
        Self {
            success: true,
            diagnostics: String::new(),
        }
    }

    pub fn failure(diagnostics: impl Into<String>) -> Self {
        Self {
            success: false,
            diagnostics: diagnostics.into(),
        }
    }
}

/// One build pipeline (native compiler or script bundler).
#[async_trait]
pub trait Pipeline: Send + Sync {
    /// Short label used in operator messages.
    fn name(&self) -> &str;

    /// Run the pipeline to completion.
    ///
    /// `Err` is reserved for failing to run the tool at all; a tool that runs
    /// and reports errors yields `Ok` with `success == false`.
    async fn run(&self) -> Result<PipelineOutcome, BuildError>;
}

/// How a finished subprocess is judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuccessCheck {
    /// Exit status 0
    ExitStatus,
    /// Exit status 0 and nothing written to stderr
    ExitStatusAndQuietStderr,
}

impl SuccessCheck {
    fn judge(self, output: &Output) -> bool {
        match self {
            SuccessCheck::ExitStatus => output.status.success(),
            SuccessCheck::ExitStatusAndQuietStderr => {
                output.status.success() && String::from_utf8_lossy(&output.stderr).trim().is_empty()
            }
        }
    }
}

/// A pipeline backed by an external command.
#[derive(Debug, Clone)]
pub struct CommandPipeline {
    name: String,
    program: OsString,
    args: Vec<OsString>,
    cwd: PathBuf,
    check: SuccessCheck,
}

impl CommandPipeline {
    /// Build from a configured command line plus generated arguments.
    ///
    /// Extra words in `command` (e.g. `npx esbuild`) go before `args`.
    pub fn new(
        name: impl Into<String>,
        command: &str,
        args: Vec<OsString>,
        cwd: &Path,
        check: SuccessCheck,
    ) -> Self {
        let mut words = command.split_whitespace().map(OsString::from);
        let program = words.next().unwrap_or_default();
        let args = words.chain(args).collect();

        Self {
            name: name.into(),
            program,
            args,
            cwd: cwd.to_path_buf(),
            check,
        }
    }

    /// Native-to-wasm compiler, run from the project root.
    pub fn native(config: &DevloopConfig) -> Self {
        Self::new(
            "native",
            &config.native.command,
            native_args(&config.native),
            &config.root,
            SuccessCheck::ExitStatus,
        )
    }

    /// Script bundler; a run that logs anything to stderr counts as failed.
    pub fn script(config: &DevloopConfig) -> Self {
        Self::new(
            "script",
            &config.script.command,
            script_args(&config.script),
            &config.root,
            SuccessCheck::ExitStatusAndQuietStderr,
        )
    }

    pub fn program(&self) -> &OsString {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Full command line for log output.
    pub fn display(&self) -> String {
        std::iter::once(&self.program)
            .chain(&self.args)
            .map(|arg| arg.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn native_args(native: &NativeConfig) -> Vec<OsString> {
    vec![
        "build".into(),
        native.crate_dir.clone().into(),
        "--target".into(),
        native.target.clone().into(),
        "--out-dir".into(),
        native.out_dir.clone().into(),
        "--no-typescript".into(),
    ]
}

fn script_args(script: &ScriptConfig) -> Vec<OsString> {
    let mut outdir = OsString::from("--outdir=");
    outdir.push(&script.out_dir);

    vec![
        script.entry.clone().into(),
        "--bundle".into(),
        outdir,
        "--format=esm".into(),
        "--sourcemap=external".into(),
        "--platform=browser".into(),
        "--log-level=error".into(),
    ]
}

/// Merge both streams, stderr first; compilers put the useful part there.
fn collect_diagnostics(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);

    [stderr.trim(), stdout.trim()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl Pipeline for CommandPipeline {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self) -> Result<PipelineOutcome, BuildError> {
        tracing::debug!(pipeline = %self.name, command = %self.display(), "spawning build");

        let output = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| BuildError::Spawn {
                program: self.program.to_string_lossy().into_owned(),
                source,
            })?;

        tracing::debug!(pipeline = %self.name, status = %output.status, "build exited");

        if self.check.judge(&output) {
            Ok(PipelineOutcome::success())
        } else {
            let mut diagnostics = collect_diagnostics(&output);
            if diagnostics.is_empty() {
                diagnostics = format!("{} exited with {}", self.program.to_string_lossy(), output.status);
            }
            Ok(PipelineOutcome::failure(diagnostics))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn test_native_command_line() {
        let config = DevloopConfig {
            root: PathBuf::from("/project"),
            ..DevloopConfig::default()
        };
        let pipeline = CommandPipeline::native(&config);

        assert_eq!(pipeline.name(), "native");
        assert_eq!(pipeline.program(), "wasm-pack");
        assert_eq!(
            pipeline.args(),
            os(&[
                "build",
                "demo/wasm",
                "--target",
                "web",
                "--out-dir",
                "../pkg",
                "--no-typescript"
            ])
            .as_slice()
        );
    }

    #[test]
    fn test_script_command_line() {
        let config = DevloopConfig::default();
        let pipeline = CommandPipeline::script(&config);

        assert_eq!(
            pipeline.display(),
            "esbuild demo/src/main.ts --bundle --outdir=demo/dist --format=esm \
             --sourcemap=external --platform=browser --log-level=error"
        );
        assert!(!pipeline.display().contains("--splitting"));
        assert!(!pipeline.display().contains("--minify"));
    }

    #[test]
    fn test_command_prefix_words_precede_generated_args() {
        let pipeline = CommandPipeline::new(
            "script",
            "npx  esbuild",
            os(&["main.ts"]),
            Path::new("."),
            SuccessCheck::ExitStatus,
        );

        assert_eq!(pipeline.program(), "npx");
        assert_eq!(pipeline.args(), os(&["esbuild", "main.ts"]).as_slice());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_zero_exit_is_success() {
        let temp = tempfile::TempDir::new().unwrap();
        let pipeline = CommandPipeline::new(
            "ok",
            "sh",
            os(&["-c", "echo built"]),
            temp.path(),
            SuccessCheck::ExitStatus,
        );

        let outcome = pipeline.run().await.unwrap();
        assert!(outcome.success);
        assert!(outcome.diagnostics.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_captures_stderr() {
        let temp = tempfile::TempDir::new().unwrap();
        let pipeline = CommandPipeline::new(
            "bad",
            "sh",
            os(&["-c", "echo 'error: expected `;`' >&2; exit 1"]),
            temp.path(),
            SuccessCheck::ExitStatus,
        );

        let outcome = pipeline.run().await.unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.diagnostics, "error: expected `;`");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stderr_output_fails_quiet_check() {
        let temp = tempfile::TempDir::new().unwrap();
        let pipeline = CommandPipeline::new(
            "script",
            "sh",
            os(&["-c", "echo 'X [ERROR] Could not resolve' >&2"]),
            temp.path(),
            SuccessCheck::ExitStatusAndQuietStderr,
        );

        let outcome = pipeline.run().await.unwrap();
        assert!(!outcome.success);
        assert!(outcome.diagnostics.contains("Could not resolve"));
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let pipeline = CommandPipeline::new(
            "native",
            "devloop-definitely-not-installed",
            Vec::new(),
            temp.path(),
            SuccessCheck::ExitStatus,
        );

        let err = pipeline.run().await.unwrap_err();
        assert!(matches!(err, BuildError::Spawn { .. }));
    }
}
