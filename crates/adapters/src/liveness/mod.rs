// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener liveness: death notification from the transport
//!
//! The registry hands a [`DeathRecipient`] to the monitor when a listener is
//! registered. When the transport learns the listener's process died, it
//! fires the recipient and the broker unsubscribes the listener.

mod noop;

pub use noop::NoOpLivenessMonitor;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeLivenessMonitor;

use ces_core::ListenerId;
use tokio::sync::mpsc;

/// One-shot death callback for a single listener
#[derive(Clone, Debug)]
pub struct DeathRecipient {
    id: ListenerId,
    tx: mpsc::UnboundedSender<ListenerId>,
}

impl DeathRecipient {
    pub fn new(id: ListenerId, tx: mpsc::UnboundedSender<ListenerId>) -> Self {
        Self { id, tx }
    }

    pub fn id(&self) -> &ListenerId {
        &self.id
    }

    /// Report the listener dead. Returns false if the broker is gone.
    pub fn notify_death(&self) -> bool {
        self.tx.send(self.id.clone()).is_ok()
    }
}

pub trait LivenessMonitor: Clone + Send + Sync + 'static {
    /// Start watching; replaces any previous recipient for the same id
    fn watch(&self, recipient: DeathRecipient);

    fn unwatch(&self, id: &ListenerId);
}
