//! Trailing-edge debouncing for watch-triggered actions.
//!
//! Each [`Debouncer`] owns a tokio task fed by an unbounded channel. A trigger
//! (re)arms a quiet window; the action fires once the window passes with no
//! further triggers. Editors that save via temp file + rename produce several
//! events per save, and this collapses them into one rebuild.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

/// Handle to a debounced action.
///
/// Dropping every handle stops the task; a pending invocation is discarded.
#[derive(Clone)]
pub struct Debouncer {
    name: &'static str,
    tx: mpsc::UnboundedSender<()>,
    pending: Arc<AtomicBool>,
}

impl Debouncer {
    /// Spawn the debounce task for `action`.
    ///
    /// The action runs on the debounce task, so it must not block; actions
    /// that need to await (builds) spawn their own task and return.
    pub fn spawn<F>(name: &'static str, window: Duration, action: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();
        let pending = Arc::new(AtomicBool::new(false));
        let task_pending = Arc::clone(&pending);

        tokio::spawn(async move {
            while rx.recv().await.is_some() {
                task_pending.store(true, Ordering::SeqCst);

                // Every trigger inside the window restarts it.
                loop {
                    match timeout(window, rx.recv()).await {
                        Ok(Some(())) => continue,
                        Ok(None) => return,
                        Err(_elapsed) => break,
                    }
                }

                task_pending.store(false, Ordering::SeqCst);
                tracing::debug!(debouncer = name, "quiet window elapsed, firing");
                action();
            }
        });

        Self { name, tx, pending }
    }

    /// Schedule the action, replacing any not-yet-fired schedule.
    pub fn trigger(&self) {
        if self.tx.send(()).is_err() {
            tracing::debug!(debouncer = self.name, "trigger after shutdown ignored");
        }
    }

    /// Whether a trigger is waiting for its quiet window.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}
