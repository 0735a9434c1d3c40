//! Build coordinator: single-flight wrapper around one [`Pipeline`].
//!
//! The native and script pipelines each get their own coordinator, so a long
//! native build never holds up a script rebuild. Within one coordinator a
//! trigger that arrives mid-build is dropped, not queued: the next filesystem
//! event is what retries it.

use crate::dev::pipeline::Pipeline;
use crate::dev::state::{BuildState, BuildStatus};
use crate::ui;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Single-flight build runner for one pipeline.
pub struct BuildCoordinator {
    pipeline: Arc<dyn Pipeline>,
    state: Mutex<BuildState>,
}

impl BuildCoordinator {
    pub fn new(pipeline: Arc<dyn Pipeline>) -> Self {
        Self {
            pipeline,
            state: Mutex::new(BuildState::new()),
        }
    }

    /// Pipeline label ("native", "script").
    pub fn name(&self) -> &str {
        self.pipeline.name()
    }

    /// Run one build.
    ///
    /// Returns `false` immediately, without spawning anything or touching
    /// state, when a build of this pipeline is already running. Otherwise
    /// returns whether the build succeeded. Failures are reported to the
    /// operator and recorded, never propagated.
    pub async fn build(&self) -> bool {
        if !self.state.lock().try_start() {
            tracing::debug!(pipeline = self.name(), "build already running, trigger dropped");
            return false;
        }

        let start = Instant::now();
        let in_flight = InFlight {
            state: &self.state,
            start,
        };

        ui::info(&format!("Building {}...", self.name()));
        let result = self.pipeline.run().await;
        let elapsed = start.elapsed();
        let duration_ms = elapsed.as_millis() as u64;

        let status = match result {
            Ok(outcome) if outcome.success => {
                ui::success(&format!(
                    "{} build finished in {}",
                    self.name(),
                    ui::format_duration(elapsed)
                ));
                BuildStatus::Success { duration_ms }
            }
            Ok(outcome) => {
                self.report_failure(elapsed, &outcome.diagnostics);
                BuildStatus::Failed {
                    duration_ms,
                    diagnostics: outcome.diagnostics,
                }
            }
            Err(err) => {
                let diagnostics = err.to_string();
                self.report_failure(elapsed, &diagnostics);
                BuildStatus::Failed {
                    duration_ms,
                    diagnostics,
                }
            }
        };

        let success = status.is_success();
        in_flight.finish(status);
        success
    }

    fn report_failure(&self, elapsed: Duration, diagnostics: &str) {
        ui::error(&format!(
            "{} build failed after {}",
            self.name(),
            ui::format_duration(elapsed)
        ));
        ui::diagnostics(diagnostics);
    }

    /// Snapshot of the current build state.
    pub fn state(&self) -> BuildState {
        self.state.lock().clone()
    }

    pub fn is_building(&self) -> bool {
        self.state.lock().is_in_progress()
    }
}

/// Releases the single-flight guard if a build never reaches `finish`
/// (the pipeline panicked or the build task was aborted).
struct InFlight<'a> {
    state: &'a Mutex<BuildState>,
    start: Instant,
}

impl InFlight<'_> {
    fn finish(self, status: BuildStatus) {
        self.state.lock().finish(status);
        std::mem::forget(self);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        tracing::warn!("build interrupted before completion");
        self.state.lock().finish(BuildStatus::Failed {
            duration_ms: self.start.elapsed().as_millis() as u64,
            diagnostics: "build interrupted".to_string(),
        });
    }
}
