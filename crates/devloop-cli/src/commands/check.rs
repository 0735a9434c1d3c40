//! Check command implementation.
//!
//! Validates configuration and toolchains without serving anything.

use crate::cli::CheckArgs;
use crate::config::DevloopConfig;
use crate::dev::WatchRegistration;
use crate::error::{BuildError, Result, ResultExt};
use crate::ui;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Execute the check command.
///
/// # Validation Steps
///
/// 1. Load and validate devloop.toml (plus environment overrides)
/// 2. Probe the native compiler and script bundler (unless `--skip-tools`)
/// 3. Report which watch roots exist
/// 4. Report whether the native artifact is already built
///
/// # Errors
///
/// Returns errors for invalid configuration or a toolchain that cannot run.
pub async fn execute(args: CheckArgs) -> Result<()> {
    ui::info("Checking configuration...");

    let config = DevloopConfig::load(&args.project)?;
    config.validate()?;

    ui::success("Configuration is valid!");
    ui::info(&format!("Project root: {}", config.root.display()));

    if args.skip_tools {
        ui::info("Skipping toolchain checks");
    } else {
        ui::info("Checking toolchains...");
        check_tools(&config).await?;
    }

    ui::info("Checking watch roots...");
    check_watch_roots(&config);

    let artifact = config.native_artifact();
    if artifact.is_file() {
        ui::success(&format!("  Native artifact present: {}", display(&config, &artifact)));
    } else {
        ui::warning(&format!(
            "  Native artifact missing: {} (built on next `devloop dev`)",
            display(&config, &artifact)
        ));
    }

    ui::success("All checks passed!");
    Ok(())
}

async fn check_tools(config: &DevloopConfig) -> Result<()> {
    for (pipeline, command) in [
        ("native", config.native.command.as_str()),
        ("script", config.script.command.as_str()),
    ] {
        let version = probe_tool(pipeline, command, &config.root)
            .await
            .context(format!("{} toolchain check failed", pipeline))?;
        ui::success(&format!("  {} ({})", command, version));
    }
    Ok(())
}

/// Run `<command> --version` and return the first line it prints.
async fn probe_tool(pipeline: &str, command: &str, cwd: &Path) -> Result<String, BuildError> {
    let mut words = command.split_whitespace();
    let program = words.next().unwrap_or_default();

    let output = Command::new(program)
        .args(words)
        .arg("--version")
        .current_dir(cwd)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|source| BuildError::Spawn {
            program: program.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(BuildError::Failed {
            pipeline: pipeline.to_string(),
            diagnostics: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(stdout
        .lines()
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .unwrap_or("version unknown")
        .to_string())
}

fn check_watch_roots(config: &DevloopConfig) {
    for registration in WatchRegistration::from_config(config) {
        let shown = display(config, &registration.root);
        if registration.root.is_dir() {
            ui::success(&format!("  {} ({})", shown, registration.action.label()));
        } else {
            ui::warning(&format!("  {} does not exist, not watched", shown));
        }
    }
}

fn display(config: &DevloopConfig, path: &Path) -> String {
    path.strip_prefix(&config.root)
        .unwrap_or(path)
        .display()
        .to_string()
}
