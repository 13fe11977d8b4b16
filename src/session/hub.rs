//! Peer registry and broadcast fan-out
//!
//! The only resource shared across sessions. Broadcasting is append-only
//! fan-out with no acknowledgment and no cross-receiver ordering guarantee;
//! the originator never receives its own broadcast.

use std::collections::HashMap;

use tokio::sync::{RwLock, mpsc};

use crate::events::ServerEvent;

/// Registry of connected sessions' outbound senders
#[derive(Debug, Default)]
pub struct PeerHub {
    senders: RwLock<HashMap<String, mpsc::Sender<ServerEvent>>>,
}

impl PeerHub {
    /// Create an empty hub
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session's outbound sender
    pub async fn register(&self, session_id: &str, tx: mpsc::Sender<ServerEvent>) {
        self.senders.write().await.insert(session_id.to_string(), tx);
        tracing::debug!(session_id, "peer registered");
    }

    /// Remove a session's outbound sender
    pub async fn deregister(&self, session_id: &str) {
        self.senders.write().await.remove(session_id);
        tracing::debug!(session_id, "peer deregistered");
    }

    /// Number of registered peers
    pub async fn peer_count(&self) -> usize {
        self.senders.read().await.len()
    }

    /// Fan an event out to every registered peer except the origin
    ///
    /// Delivery is best-effort: a full or closed receiver is skipped with a
    /// diagnostic, never blocking the caller. Returns the number of peers
    /// the event was handed to.
    pub async fn broadcast_except(&self, origin: &str, event: &ServerEvent) -> usize {
        let senders = self.senders.read().await;
        let mut delivered = 0;
        for (session_id, tx) in senders.iter() {
            if session_id == origin {
                continue;
            }
            match tx.try_send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::debug!(
                        peer = %session_id,
                        error = %e,
                        "broadcast delivery skipped"
                    );
                }
            }
        }
        delivered
    }
}
