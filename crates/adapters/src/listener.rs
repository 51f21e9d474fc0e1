// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recording listener for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use ces_core::{CommonEventData, CommonEventListener, ListenerHandle, ListenerId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// Global delivery counter so deliveries to different listeners can be ordered
static DELIVERY_SEQ: AtomicU64 = AtomicU64::new(0);

/// One notification as seen by a listener
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub data: CommonEventData,
    pub ordered: bool,
    pub sticky: bool,
    pub seq: u64,
}

impl Delivery {
    pub fn action(&self) -> &str {
        self.data.action()
    }
}

/// Listener that records every notification
pub struct RecordingListener {
    deliveries: Mutex<Vec<Delivery>>,
    count: watch::Sender<usize>,
}

impl RecordingListener {
    pub fn new() -> Arc<Self> {
        let (count, _) = watch::channel(0);
        Arc::new(Self {
            deliveries: Mutex::new(Vec::new()),
            count,
        })
    }

    /// Strong handle under a fixed id; keep it alive for as long as the
    /// listener should receive events
    pub fn handle(self: &Arc<Self>, id: &str) -> ListenerHandle {
        ListenerHandle::with_id(ListenerId::new(id), self.clone())
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn actions(&self) -> Vec<String> {
        self.deliveries()
            .iter()
            .map(|d| d.action().to_string())
            .collect()
    }

    pub fn last(&self) -> Option<Delivery> {
        self.deliveries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }

    pub fn len(&self) -> usize {
        *self.count.borrow()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wait until at least `n` notifications have arrived
    pub async fn wait_for(&self, n: usize) {
        let mut rx = self.count.subscribe();
        let _ = rx.wait_for(|count| *count >= n).await;
    }
}

impl CommonEventListener for RecordingListener {
    fn notify_event(&self, data: &CommonEventData, ordered: bool, sticky: bool) {
        let mut deliveries = self.deliveries.lock().unwrap_or_else(|e| e.into_inner());
        deliveries.push(Delivery {
            data: data.clone(),
            ordered,
            sticky,
            seq: DELIVERY_SEQ.fetch_add(1, Ordering::SeqCst),
        });
        self.count.send_replace(deliveries.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ces_core::Want;

    #[tokio::test]
    async fn records_and_wakes_waiters() {
        let listener = RecordingListener::new();
        let handle = listener.handle("l-1");
        assert!(listener.is_empty());

        handle.notify_event(&CommonEventData::new(Want::new("a")), false, true);
        handle.notify_event(&CommonEventData::new(Want::new("b")), true, false);
        listener.wait_for(2).await;

        assert_eq!(listener.actions(), vec!["a", "b"]);
        let deliveries = listener.deliveries();
        assert!(deliveries[0].sticky);
        assert!(deliveries[1].ordered);
        assert!(deliveries[0].seq < deliveries[1].seq);
        assert_eq!(listener.last().map(|d| d.action().to_string()), Some("b".to_string()));
    }
}
