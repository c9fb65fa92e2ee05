//! Shutdown coordination for both listeners.
//!
//! The entry and management listeners each hold a receiver and pass it to
//! axum's graceful shutdown. A trigger from a signal, or from one listener
//! exiting on its own, stops accepting on both and lets in-flight requests
//! drain. Upgraded connections are detached from their listener and are not
//! waited on.

use tokio::sync::broadcast;

/// Coordinator for graceful shutdown.
///
/// Each listener subscribes before it starts serving; one `trigger` stops all of them.
#[derive(Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Number of listeners still waiting for the signal. Drops as each
    /// listener finishes draining and releases its receiver.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
