//! Development server command implementation.
//!
//! Orchestrates the entire dev server lifecycle:
//! - Initial script build, then a native build only if its artifact is missing
//! - File watching routed through per-action debouncers
//! - HTTP server with the reload push channel and keep-alive ticker
//! - Graceful exit on Ctrl+C

use crate::cli::DevArgs;
use crate::config::DevloopConfig;
use crate::dev::{
    ChangeDispatcher, DevServer, DevServerState, FileWatcher, SharedState, WatchRegistration,
};
use crate::error::Result;
use crate::ui;
use std::path::Path;
use std::sync::Arc;
use tokio::signal;

/// Execute the dev command.
///
/// # Process Flow
///
/// 1. Load configuration (file, environment, CLI flags) and validate it
/// 2. Run the startup builds; failures are reported, never fatal
/// 3. Start the file watcher and the change dispatcher
/// 4. Start the keep-alive ticker and the HTTP server
/// 5. Wait for Ctrl+C or for the server task to end
///
/// # Errors
///
/// Returns errors for:
/// - Invalid configuration
/// - Watcher setup failures
/// - Server startup failures (e.g. port in use)
pub async fn execute(args: DevArgs) -> Result<()> {
    let config = DevloopConfig::load(&args.project)?.with_overrides(
        args.host,
        args.port,
        args.no_watch,
    );
    config.validate()?;

    ui::info("Starting development server...");
    ui::info(&format!("Project root: {}", config.root.display()));

    let state: SharedState = Arc::new(DevServerState::from_config(&config));

    // Step 1: Startup builds
    initial_builds(&config, &state).await;

    // Step 2: File watcher; dropping it stops watching, so keep it until exit
    let _watcher = if config.watch.enabled {
        Some(start_watching(&config, &state)?)
    } else {
        ui::warning("File watching disabled; edits will not rebuild or reload");
        None
    };

    // Step 3: Keep-alive ticker and HTTP server
    let keep_alive = state.reload.spawn_keep_alive(config.watch.keep_alive());

    let server = DevServer::new(config.addr(), Arc::clone(&state));
    let mut server_handle = tokio::spawn(server.start());

    if args.open {
        open_browser(&config.server_url());
    }

    ui::info("Press Ctrl+C to stop");

    let outcome = tokio::select! {
        _ = signal::ctrl_c() => {
            ui::info("Shutting down development server...");
            Ok(())
        }
        joined = &mut server_handle => match joined {
            Ok(result) => result,
            Err(e) => Err(crate::error::CliError::Server(format!("Server task failed: {}", e))),
        },
    };

    keep_alive.abort();
    server_handle.abort();
    outcome?;

    ui::success("Development server stopped");
    Ok(())
}

/// Script build first, then a native build only when the artifact is absent.
///
/// Nobody is connected yet, so no reload is broadcast.
pub async fn initial_builds(config: &DevloopConfig, state: &SharedState) {
    state.script.build().await;

    let artifact = config.native_artifact();
    if artifact.is_file() {
        tracing::debug!(artifact = %artifact.display(), "native artifact present, skipping build");
        ui::info("Native artifact found, skipping initial native build");
    } else {
        ui::info(&format!(
            "Native artifact missing ({}), building",
            relative_to(&config.root, &artifact).display()
        ));
        state.native.build().await;
    }
}

/// Register every existing watch root and spawn the dispatch task.
fn start_watching(config: &DevloopConfig, state: &SharedState) -> Result<FileWatcher> {
    let (watcher, changes) = FileWatcher::new(WatchRegistration::from_config(config))?;

    for registration in watcher.registrations() {
        ui::info(&format!(
            "Watching {} ({})",
            relative_to(&config.root, &registration.root).display(),
            registration.action.label()
        ));
    }

    let dispatcher = ChangeDispatcher::new(state, config.watch.debounce());
    tokio::spawn(dispatcher.run(watcher.registrations().to_vec(), changes));

    Ok(watcher)
}

fn relative_to<'a>(root: &Path, path: &'a Path) -> &'a Path {
    path.strip_prefix(root).unwrap_or(path)
}

/// Open the server URL in the default browser.
///
/// Uses platform-specific commands:
/// - macOS: `open`
/// - Windows: `start`
/// - Linux: `xdg-open`
fn open_browser(url: &str) {
    use std::process::Command;

    let result = if cfg!(target_os = "macos") {
        Command::new("open").arg(url).spawn()
    } else if cfg!(target_os = "windows") {
        Command::new("cmd").args(["/C", "start", url]).spawn()
    } else {
        Command::new("xdg-open").arg(url).spawn()
    };

    match result {
        Ok(_) => ui::info(&format!("Opened browser at {}", url)),
        Err(e) => ui::warning(&format!("Failed to open browser: {}", e)),
    }
}
