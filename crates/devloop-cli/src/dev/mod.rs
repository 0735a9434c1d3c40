//! Development server module.
//!
//! Provides a live-reloading development server with:
//! - Static file serving with SPA fallback and cross-origin isolation
//! - Native and script build pipelines, each single-flight
//! - File watching with per-action debouncing
//! - Reload push via Server-Sent Events

pub mod builder;
pub mod debounce;
mod headers;
pub mod pipeline;
pub mod reload;
pub mod server;
pub mod state;
pub mod static_files;
pub mod watcher;

// Re-exports
pub use builder::BuildCoordinator;
pub use debounce::Debouncer;
pub use pipeline::{CommandPipeline, Pipeline, PipelineOutcome, SuccessCheck};
pub use reload::{ReloadBroadcaster, ReloadFrame, RELOAD_ENDPOINT};
pub use server::{router, DevServer};
pub use state::{BuildState, BuildStatus, DevServerState, SharedState};
pub use static_files::{StaticFiles, StaticResponse};
pub use watcher::{ChangeDispatcher, FileChange, FileWatcher, WatchAction, WatchRegistration};
