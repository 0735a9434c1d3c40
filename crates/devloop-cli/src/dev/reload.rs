//! Live reload broadcaster.
//!
//! Owns the registry of open push channels. Each `GET /__dev_reload` request
//! registers one channel; the SSE stream for that request holds a guard that
//! unregisters it when axum drops the stream (client disconnect or abort).
//! Writes that find the receiving side gone prune the channel on the spot.

use axum::response::sse::Event;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio_stream::Stream;

/// Path of the push endpoint.
pub const RELOAD_ENDPOINT: &str = "/__dev_reload";

/// Frames buffered per client before new frames are dropped for it.
const CHANNEL_CAPACITY: usize = 16;

/// One frame on a push channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadFrame {
    /// Sent once, right after the channel opens
    Connected,
    /// Tells the page to reload
    Reload,
    /// Periodic comment keeping idle proxies from closing the connection
    KeepAlive,
}

impl ReloadFrame {
    pub fn to_event(self) -> Event {
        match self {
            ReloadFrame::Connected => Event::default().comment("connected"),
            ReloadFrame::Reload => Event::default().data("reload"),
            ReloadFrame::KeepAlive => Event::default().comment("keep-alive"),
        }
    }
}

/// Registry of open push channels.
#[derive(Default)]
pub struct ReloadBroadcaster {
    clients: RwLock<HashMap<usize, mpsc::Sender<ReloadFrame>>>,
    next_id: AtomicUsize,
}

impl ReloadBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new channel.
    ///
    /// The receiver already holds a [`ReloadFrame::Connected`] frame.
    pub fn register(&self) -> (usize, mpsc::Receiver<ReloadFrame>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

        // fresh channel with spare capacity: cannot fail
        let _ = tx.try_send(ReloadFrame::Connected);
        self.clients.write().insert(id, tx);

        tracing::debug!(client = id, "reload channel opened");
        (id, rx)
    }

    /// Remove a channel. Returns whether it was still registered.
    pub fn unregister(&self, id: usize) -> bool {
        let removed = self.clients.write().remove(&id).is_some();
        if removed {
            tracing::debug!(client = id, "reload channel closed");
        }
        removed
    }

    /// Send a reload frame to every open channel.
    ///
    /// Returns how many channels accepted the frame.
    pub fn broadcast(&self) -> usize {
        let delivered = self.send_all(ReloadFrame::Reload);
        tracing::info!(clients = delivered, "reload broadcast");
        delivered
    }

    /// Send a keep-alive frame to every open channel.
    pub fn keep_alive(&self) -> usize {
        self.send_all(ReloadFrame::KeepAlive)
    }

    /// Closed channels are pruned. A full channel loses a keep-alive frame
    /// but is pruned when it cannot take a reload: dropping the sender ends
    /// its stream, and the browser's EventSource reconnects.
    fn send_all(&self, frame: ReloadFrame) -> usize {
        let mut delivered = 0;
        let mut pruned = Vec::new();

        {
            let clients = self.clients.read();
            for (&id, tx) in clients.iter() {
                match tx.try_send(frame) {
                    Ok(()) => delivered += 1,
                    Err(TrySendError::Closed(_)) => pruned.push(id),
                    Err(TrySendError::Full(_)) if frame == ReloadFrame::Reload => {
                        tracing::debug!(client = id, "client not draining, reload undeliverable");
                        pruned.push(id);
                    }
                    Err(TrySendError::Full(_)) => {
                        tracing::debug!(client = id, ?frame, "client not draining, frame dropped");
                    }
                }
            }
        }

        if !pruned.is_empty() {
            let mut clients = self.clients.write();
            for id in pruned {
                clients.remove(&id);
                tracing::debug!(client = id, "pruned reload channel");
            }
        }

        delivered
    }

    /// Number of open channels.
    pub fn client_count(&self) -> usize {
        self.clients.read().len()
    }

    pub fn is_registered(&self, id: usize) -> bool {
        self.clients.read().contains_key(&id)
    }

    /// Spawn the keep-alive ticker. The first frame goes out one full
    /// `interval` after the call.
    pub fn spawn_keep_alive(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let broadcaster = Arc::clone(self);
        tokio::spawn(async move {
            let start = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(start, interval);
            loop {
                ticker.tick().await;
                let delivered = broadcaster.keep_alive();
                tracing::trace!(clients = delivered, "keep-alive sent");
            }
        })
    }

    /// Register a channel and expose it as an SSE event stream.
    pub fn subscribe(self: &Arc<Self>) -> impl Stream<Item = Result<Event, Infallible>> + use<> {
        let (id, mut rx) = self.register();
        let guard = ChannelGuard {
            id,
            broadcaster: Arc::clone(self),
        };

        async_stream::stream! {
            let _guard = guard;
            while let Some(frame) = rx.recv().await {
                yield Ok(frame.to_event());
            }
        }
    }
}

/// Unregisters its channel when the owning stream is dropped.
struct ChannelGuard {
    id: usize,
    broadcaster: Arc<ReloadBroadcaster>,
}

impl Drop for ChannelGuard {
    fn drop(&mut self) {
        self.broadcaster.unregister(self.id);
    }
}
