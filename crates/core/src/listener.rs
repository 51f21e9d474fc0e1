// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener handles: the delivery sink a subscriber registers
//!
//! The caller owns the strong [`ListenerHandle`]; the broker keeps only a
//! [`WeakListener`]. When the owning side drops its handle, delivery to that
//! listener is skipped, while the id stays usable for removal.

use crate::id::ListenerId;
use crate::want::CommonEventData;
use std::fmt;
use std::sync::{Arc, Weak};

/// Delivery primitive implemented by the transport.
///
/// Called from the broker's dispatch loops; implementations must not block
/// for long and must be safe to call from any thread.
pub trait CommonEventListener: Send + Sync {
    fn notify_event(&self, data: &CommonEventData, ordered: bool, sticky: bool);
}

/// Strong, identity-carrying reference to a listener
#[derive(Clone)]
pub struct ListenerHandle {
    id: ListenerId,
    listener: Arc<dyn CommonEventListener>,
}

impl ListenerHandle {
    /// Wrap a listener under a freshly generated id
    pub fn new(listener: Arc<dyn CommonEventListener>) -> Self {
        Self::with_id(ListenerId::generate(), listener)
    }

    pub fn with_id(id: ListenerId, listener: Arc<dyn CommonEventListener>) -> Self {
        Self { id, listener }
    }

    pub fn id(&self) -> &ListenerId {
        &self.id
    }

    pub fn notify_event(&self, data: &CommonEventData, ordered: bool, sticky: bool) {
        self.listener.notify_event(data, ordered, sticky);
    }

    pub fn downgrade(&self) -> WeakListener {
        WeakListener {
            id: self.id.clone(),
            listener: Arc::downgrade(&self.listener),
        }
    }
}

impl fmt::Debug for ListenerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerHandle").field("id", &self.id).finish()
    }
}

/// Non-owning reference kept by the registry
#[derive(Clone)]
pub struct WeakListener {
    id: ListenerId,
    listener: Weak<dyn CommonEventListener>,
}

impl WeakListener {
    pub fn id(&self) -> &ListenerId {
        &self.id
    }

    /// Strong handle, or `None` once the owner has gone away
    pub fn upgrade(&self) -> Option<ListenerHandle> {
        self.listener.upgrade().map(|listener| ListenerHandle {
            id: self.id.clone(),
            listener,
        })
    }

    pub fn is_alive(&self) -> bool {
        self.listener.strong_count() > 0
    }
}

impl fmt::Debug for WeakListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakListener")
            .field("id", &self.id)
            .field("alive", &self.is_alive())
            .finish()
    }
}
