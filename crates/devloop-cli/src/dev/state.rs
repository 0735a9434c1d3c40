//! Shared state for the development server.
//!
//! Each pipeline owns one [`BuildState`] behind a `parking_lot::Mutex`. The
//! in-progress flag is the single-flight guard; it is checked and set under
//! the same lock so two triggers can never both win.

use crate::config::DevloopConfig;
use crate::dev::builder::BuildCoordinator;
use crate::dev::pipeline::{CommandPipeline, Pipeline};
use crate::dev::reload::ReloadBroadcaster;
use crate::dev::static_files::StaticFiles;
use std::sync::Arc;
use std::time::Instant;

/// Build status tracking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStatus {
    /// No build has been performed yet
    NotStarted,
    /// Build completed successfully
    Success { duration_ms: u64 },
    /// Build failed; diagnostics hold the captured tool output
    Failed {
        duration_ms: u64,
        diagnostics: String,
    },
}

impl BuildStatus {
    /// Check if last build succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, BuildStatus::Success { .. })
    }

    /// Check if build has not started yet.
    pub fn is_not_started(&self) -> bool {
        matches!(self, BuildStatus::NotStarted)
    }

    /// Get captured diagnostics if failed.
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            BuildStatus::Failed { diagnostics, .. } => Some(diagnostics),
            _ => None,
        }
    }
}

/// Mutable state of one build pipeline.
#[derive(Debug, Clone)]
pub struct BuildState {
    in_progress: bool,
    last_run: Option<Instant>,
    last_status: BuildStatus,
}

impl BuildState {
    pub fn new() -> Self {
        Self {
            in_progress: false,
            last_run: None,
            last_status: BuildStatus::NotStarted,
        }
    }

    /// Claim the pipeline for a build.
    ///
    /// Returns `false` and leaves the state untouched when a build is
    /// already running.
    pub fn try_start(&mut self) -> bool {
        if self.in_progress {
            return false;
        }
        self.in_progress = true;
        self.last_run = Some(Instant::now());
        true
    }

    /// Release the pipeline and record the outcome.
    pub fn finish(&mut self, status: BuildStatus) {
        self.in_progress = false;
        self.last_status = status;
    }

    pub fn is_in_progress(&self) -> bool {
        self.in_progress
    }

    pub fn last_run(&self) -> Option<Instant> {
        self.last_run
    }

    pub fn last_status(&self) -> &BuildStatus {
        &self.last_status
    }
}

impl Default for BuildState {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything the HTTP handlers and watch actions share.
pub struct DevServerState {
    pub native: Arc<BuildCoordinator>,
    pub script: Arc<BuildCoordinator>,
    pub reload: Arc<ReloadBroadcaster>,
    pub files: StaticFiles,
}

impl DevServerState {
    /// Wire up explicit pipelines; tests pass fakes here.
    pub fn new(native: Arc<dyn Pipeline>, script: Arc<dyn Pipeline>, files: StaticFiles) -> Self {
        Self {
            native: Arc::new(BuildCoordinator::new(native)),
            script: Arc::new(BuildCoordinator::new(script)),
            reload: Arc::new(ReloadBroadcaster::new()),
            files,
        }
    }

    /// State backed by the configured external toolchains.
    pub fn from_config(config: &DevloopConfig) -> Self {
        Self::new(
            Arc::new(CommandPipeline::native(config)),
            Arc::new(CommandPipeline::script(config)),
            StaticFiles::from_config(config),
        )
    }

    /// Build one pipeline and, if it succeeded, tell every client to reload.
    pub async fn rebuild_and_reload(&self, coordinator: &BuildCoordinator) -> bool {
        let success = coordinator.build().await;
        if success {
            self.reload.broadcast();
        }
        success
    }
}

/// Shared state handle for passing around the application.
pub type SharedState = Arc<DevServerState>;
