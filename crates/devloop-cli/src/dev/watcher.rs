//! File watch subsystem.
//!
//! One notify watcher covers every configured root. Its callback runs on
//! notify's own thread and only forwards [`FileChange`] messages into a tokio
//! channel; classification and debouncing happen on the async side, which is
//! also where tests inject synthetic changes.

use crate::config::DevloopConfig;
use crate::dev::builder::BuildCoordinator;
use crate::dev::debounce::Debouncer;
use crate::dev::state::{DevServerState, SharedState};
use crate::error::Result;
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Buffered changes between the notify thread and the dispatch task.
const CHANGE_CHANNEL_CAPACITY: usize = 256;

/// File change event type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    /// File was modified
    Modified(PathBuf),
    /// File was created
    Created(PathBuf),
    /// File was removed
    Removed(PathBuf),
}

impl FileChange {
    /// Get the path affected by this change.
    pub fn path(&self) -> &Path {
        match self {
            FileChange::Modified(p) | FileChange::Created(p) | FileChange::Removed(p) => p,
        }
    }

    /// Convert a notify event kind; metadata-only and access events yield `None`.
    fn from_kind(kind: &EventKind, path: PathBuf) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(FileChange::Created(path)),
            EventKind::Modify(ModifyKind::Metadata(_)) => None,
            EventKind::Modify(_) => Some(FileChange::Modified(path)),
            EventKind::Remove(_) => Some(FileChange::Removed(path)),
            _ => None,
        }
    }
}

/// What a matching change sets off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchAction {
    RebuildNative,
    RebuildScript,
    /// Markup or stylesheet change: reload without building
    Reload,
}

impl WatchAction {
    pub fn label(self) -> &'static str {
        match self {
            WatchAction::RebuildNative => "native rebuild",
            WatchAction::RebuildScript => "script rebuild",
            WatchAction::Reload => "reload",
        }
    }
}

/// One watched root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchRegistration {
    pub root: PathBuf,
    pub recursive: bool,
    pub extensions: Vec<String>,
    pub action: WatchAction,
}

impl WatchRegistration {
    fn new(root: PathBuf, recursive: bool, extensions: &[String], action: WatchAction) -> Self {
        Self {
            root,
            recursive,
            extensions: extensions.to_vec(),
            action,
        }
    }

    /// Every root the configuration names, present on disk or not.
    pub fn from_config(config: &DevloopConfig) -> Vec<Self> {
        let mut registrations: Vec<Self> = config
            .native
            .sources
            .iter()
            .map(|dir| {
                Self::new(
                    config.resolve(dir),
                    true,
                    &config.native.extensions,
                    WatchAction::RebuildNative,
                )
            })
            .collect();

        registrations.push(Self::new(
            config.resolve(&config.script.sources),
            true,
            &config.script.extensions,
            WatchAction::RebuildScript,
        ));
        registrations.push(Self::new(
            config.site_dir(),
            false,
            &config.site.markup_extensions,
            WatchAction::Reload,
        ));
        registrations.push(Self::new(
            config.resolve(&config.site.styles),
            true,
            &config.site.style_extensions,
            WatchAction::Reload,
        ));

        registrations
    }

    /// Whether `path` falls under this root and has a watched extension.
    pub fn matches(&self, path: &Path) -> bool {
        let in_scope = if self.recursive {
            path.starts_with(&self.root)
        } else {
            path.parent() == Some(self.root.as_path())
        };

        in_scope
            && path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
    }

    fn mode(&self) -> RecursiveMode {
        if self.recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        }
    }
}

/// Route a changed path to the first registration that claims it.
pub fn classify(registrations: &[WatchRegistration], path: &Path) -> Option<WatchAction> {
    registrations
        .iter()
        .find(|registration| registration.matches(path))
        .map(|registration| registration.action)
}

/// Recursive watcher over the registered roots.
pub struct FileWatcher {
    /// Underlying notify watcher
    _watcher: RecommendedWatcher,
    registrations: Vec<WatchRegistration>,
    skipped: Vec<PathBuf>,
}

impl FileWatcher {
    /// Start watching.
    ///
    /// Roots missing on disk are skipped, not errors. Existing roots are
    /// canonicalized so they compare equal to the paths notify reports.
    pub fn new(
        registrations: Vec<WatchRegistration>,
    ) -> Result<(Self, mpsc::Receiver<FileChange>)> {
        let (tx, rx) = mpsc::channel(CHANGE_CHANNEL_CAPACITY);

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            match res {
                Ok(event) => {
                    for path in event.paths {
                        if let Some(change) = FileChange::from_kind(&event.kind, path) {
                            // receiver gone means the server is shutting down
                            let _ = tx.blocking_send(change);
                        }
                    }
                }
                Err(e) => tracing::warn!(error = %e, "file watcher error"),
            }
        })?;

        let mut active = Vec::new();
        let mut skipped = Vec::new();

        for mut registration in registrations {
            if !registration.root.is_dir() {
                tracing::debug!(root = %registration.root.display(), "watch root missing, skipped");
                skipped.push(registration.root);
                continue;
            }

            if let Ok(canonical) = registration.root.canonicalize() {
                registration.root = canonical;
            }

            watcher.watch(&registration.root, registration.mode())?;
            tracing::debug!(
                root = %registration.root.display(),
                action = ?registration.action,
                recursive = registration.recursive,
                "watching"
            );
            active.push(registration);
        }

        Ok((
            Self {
                _watcher: watcher,
                registrations: active,
                skipped,
            },
            rx,
        ))
    }

    /// Registrations that are actually being watched.
    pub fn registrations(&self) -> &[WatchRegistration] {
        &self.registrations
    }

    /// Configured roots that did not exist at startup.
    pub fn skipped(&self) -> &[PathBuf] {
        &self.skipped
    }
}

/// Debounced triggers, one per action.
#[derive(Clone)]
pub struct ChangeDispatcher {
    pub native: Debouncer,
    pub script: Debouncer,
    pub reload: Debouncer,
}

impl ChangeDispatcher {
    /// Debouncers wired to the server's coordinators and broadcaster.
    ///
    /// Rebuild actions spawn the build and return, so a trigger that fires
    /// while the previous build is still running reaches the coordinator and
    /// is dropped there by the single-flight guard.
    pub fn new(state: &SharedState, window: Duration) -> Self {
        let rebuild = |pick: fn(&DevServerState) -> &Arc<BuildCoordinator>| {
            let state = Arc::clone(state);
            move || {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let coordinator = Arc::clone(pick(&state));
                    state.rebuild_and_reload(&coordinator).await;
                });
            }
        };

        let reload = Arc::clone(&state.reload);

        Self {
            native: Debouncer::spawn("native", window, rebuild(|s| &s.native)),
            script: Debouncer::spawn("script", window, rebuild(|s| &s.script)),
            reload: Debouncer::spawn("reload", window, move || {
                reload.broadcast();
            }),
        }
    }

    pub fn debouncer(&self, action: WatchAction) -> &Debouncer {
        match action {
            WatchAction::RebuildNative => &self.native,
            WatchAction::RebuildScript => &self.script,
            WatchAction::Reload => &self.reload,
        }
    }

    /// Classify one change and trigger the matching debouncer.
    pub fn dispatch(
        &self,
        registrations: &[WatchRegistration],
        change: &FileChange,
    ) -> Option<WatchAction> {
        let action = classify(registrations, change.path());
        match action {
            Some(action) => {
                tracing::debug!(path = %change.path().display(), ?action, "change routed");
                self.debouncer(action).trigger();
            }
            None => tracing::trace!(path = %change.path().display(), "change ignored"),
        }
        action
    }

    /// Drain the change channel until every sender is gone.
    pub async fn run(
        self,
        registrations: Vec<WatchRegistration>,
        mut rx: mpsc::Receiver<FileChange>,
    ) {
        while let Some(change) = rx.recv().await {
            self.dispatch(&registrations, &change);
        }
        tracing::debug!("change channel closed, dispatcher stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dev::ReloadFrame;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn project_config() -> DevloopConfig {
        DevloopConfig {
            root: PathBuf::from("/project"),
            ..DevloopConfig::default()
        }
    }

    fn action_for(path: &str) -> Option<WatchAction> {
        let registrations = WatchRegistration::from_config(&project_config());
        classify(&registrations, Path::new(path))
    }

    #[test]
    fn test_file_change_path() {
        let path = PathBuf::from("/project/src/lib.rs");

        let change = FileChange::Modified(path.clone());
        assert_eq!(change.path(), path.as_path());

        let change = FileChange::Created(path.clone());
        assert_eq!(change.path(), path.as_path());

        let change = FileChange::Removed(path.clone());
        assert_eq!(change.path(), path.as_path());
    }

    #[test]
    fn test_metadata_and_access_events_ignored() {
        use notify::event::{AccessKind, CreateKind, MetadataKind};
        let path = PathBuf::from("/project/src/lib.rs");

        let metadata = EventKind::Modify(ModifyKind::Metadata(MetadataKind::Any));
        assert!(FileChange::from_kind(&metadata, path.clone()).is_none());

        let access = EventKind::Access(AccessKind::Any);
        assert!(FileChange::from_kind(&access, path.clone()).is_none());

        assert_eq!(
            FileChange::from_kind(&EventKind::Create(CreateKind::File), path.clone()),
            Some(FileChange::Created(path))
        );
    }

    #[test]
    fn test_classify_by_root_and_extension() {
        assert_eq!(action_for("/project/src/sweep.rs"), Some(WatchAction::RebuildNative));
        assert_eq!(action_for("/project/demo/wasm/src/lib.rs"), Some(WatchAction::RebuildNative));
        assert_eq!(action_for("/project/demo/src/main.ts"), Some(WatchAction::RebuildScript));
        assert_eq!(action_for("/project/demo/src/ui/canvas.js"), Some(WatchAction::RebuildScript));
        assert_eq!(action_for("/project/demo/index.html"), Some(WatchAction::Reload));
        assert_eq!(action_for("/project/demo/css/theme/dark.css"), Some(WatchAction::Reload));
    }

    #[test]
    fn test_classify_ignores_everything_else() {
        // wrong extension for the root
        assert_eq!(action_for("/project/src/notes.md"), None);
        assert_eq!(action_for("/project/demo/src/main.rs"), None);
        // build outputs
        assert_eq!(action_for("/project/demo/dist/main.js"), None);
        assert_eq!(action_for("/project/demo/pkg/tess2_wasm.js"), None);
        // markup root is not recursive
        assert_eq!(action_for("/project/demo/partials/nav.html"), None);
        // no extension at all
        assert_eq!(action_for("/project/src/Makefile"), None);
    }

    #[test]
    fn test_missing_roots_are_skipped() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("demo/src")).unwrap();

        let config = DevloopConfig {
            root: temp.path().to_path_buf(),
            ..DevloopConfig::default()
        };

        let (watcher, _rx) = FileWatcher::new(WatchRegistration::from_config(&config)).unwrap();

        let actions: Vec<_> = watcher.registrations().iter().map(|r| r.action).collect();
        assert_eq!(actions, vec![WatchAction::RebuildScript, WatchAction::Reload]);
        // src, demo/wasm/src and demo/css do not exist
        assert_eq!(watcher.skipped().len(), 3);
    }

    fn counting_debouncer(name: &'static str, count: &Arc<AtomicUsize>) -> Debouncer {
        let count = Arc::clone(count);
        Debouncer::spawn(name, Duration::from_millis(100), move || {
            count.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_stylesheet_burst_gives_one_reload() {
        let native = Arc::new(AtomicUsize::new(0));
        let script = Arc::new(AtomicUsize::new(0));
        let reload = Arc::new(AtomicUsize::new(0));
        let dispatcher = ChangeDispatcher {
            native: counting_debouncer("native", &native),
            script: counting_debouncer("script", &script),
            reload: counting_debouncer("reload", &reload),
        };
        let registrations = WatchRegistration::from_config(&project_config());
        let (tx, rx) = mpsc::channel(8);
        let task = tokio::spawn(dispatcher.run(registrations, rx));

        let css = PathBuf::from("/project/demo/css/main.css");
        tx.send(FileChange::Modified(css.clone())).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        tx.send(FileChange::Modified(css)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(reload.load(Ordering::SeqCst), 1);
        assert_eq!(native.load(Ordering::SeqCst), 0);
        assert_eq!(script.load(Ordering::SeqCst), 0);

        drop(tx);
        task.await.unwrap();
    }

    /// Pipeline whose outcome can be flipped between runs.
    struct SwitchPipeline {
        runs: AtomicUsize,
        succeed: std::sync::atomic::AtomicBool,
    }

    impl SwitchPipeline {
        fn new(succeed: bool) -> Arc<Self> {
            Arc::new(Self {
                runs: AtomicUsize::new(0),
                succeed: std::sync::atomic::AtomicBool::new(succeed),
            })
        }

        fn runs(&self) -> usize {
            self.runs.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl crate::dev::Pipeline for SwitchPipeline {
        fn name(&self) -> &str {
            "switch"
        }

        async fn run(
            &self,
        ) -> std::result::Result<crate::dev::PipelineOutcome, crate::error::BuildError> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            if self.succeed.load(Ordering::SeqCst) {
                Ok(crate::dev::PipelineOutcome::success())
            } else {
                Ok(crate::dev::PipelineOutcome::failure("error[E0425]: cannot find value"))
            }
        }
    }

    fn wired_state(native: &Arc<SwitchPipeline>, script: &Arc<SwitchPipeline>) -> SharedState {
        Arc::new(DevServerState::new(
            native.clone(),
            script.clone(),
            crate::dev::StaticFiles::new("/project/demo", "index.html"),
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn test_native_burst_builds_once_and_reloads_once() {
        let native = SwitchPipeline::new(true);
        let script = SwitchPipeline::new(true);
        let state = wired_state(&native, &script);
        let dispatcher = ChangeDispatcher::new(&state, Duration::from_millis(100));
        let registrations = WatchRegistration::from_config(&project_config());
        let (_id, mut frames) = state.reload.register();
        assert_eq!(frames.try_recv().unwrap(), ReloadFrame::Connected);

        for name in ["a.rs", "b.rs", "a.rs"] {
            let change = FileChange::Modified(PathBuf::from("/project/src").join(name));
            assert_eq!(
                dispatcher.dispatch(&registrations, &change),
                Some(WatchAction::RebuildNative)
            );
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(native.runs(), 1);
        assert_eq!(script.runs(), 0);
        assert_eq!(frames.try_recv().unwrap(), ReloadFrame::Reload);
        assert!(frames.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_build_skips_reload_and_later_trigger_runs() {
        let native = SwitchPipeline::new(false);
        let script = SwitchPipeline::new(true);
        let state = wired_state(&native, &script);
        let dispatcher = ChangeDispatcher::new(&state, Duration::from_millis(100));
        let registrations = WatchRegistration::from_config(&project_config());
        let (_id, mut frames) = state.reload.register();
        assert_eq!(frames.try_recv().unwrap(), ReloadFrame::Connected);
        let change = FileChange::Modified(PathBuf::from("/project/demo/wasm/src/lib.rs"));

        dispatcher.dispatch(&registrations, &change);
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(native.runs(), 1);
        assert!(frames.try_recv().is_err());
        assert!(!state.native.state().last_status().is_success());
        assert!(!state.native.is_building());

        native.succeed.store(true, Ordering::SeqCst);
        dispatcher.dispatch(&registrations, &change);
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(native.runs(), 2);
        assert_eq!(frames.try_recv().unwrap(), ReloadFrame::Reload);
    }

    #[tokio::test]
    async fn test_absent_native_root_leaves_only_script_reacting() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("demo/src")).unwrap();
        let config = DevloopConfig {
            root: temp.path().to_path_buf(),
            ..DevloopConfig::default()
        };
        let (watcher, _rx) = FileWatcher::new(WatchRegistration::from_config(&config)).unwrap();

        let native = SwitchPipeline::new(true);
        let script = SwitchPipeline::new(true);
        let state = wired_state(&native, &script);
        let dispatcher = ChangeDispatcher::new(&state, Duration::from_millis(10));
        let registrations = watcher.registrations();

        let rust_change = FileChange::Modified(temp.path().join("src/lib.rs"));
        assert_eq!(dispatcher.dispatch(registrations, &rust_change), None);

        let script_root = &registrations[0].root;
        let script_change = FileChange::Modified(script_root.join("main.ts"));
        assert_eq!(
            dispatcher.dispatch(registrations, &script_change),
            Some(WatchAction::RebuildScript)
        );

        tokio::time::timeout(Duration::from_secs(5), async {
            while script.runs() == 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        assert_eq!(native.runs(), 0);
        assert_eq!(script.runs(), 1);
    }
}
