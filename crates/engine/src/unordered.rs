// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unordered dispatch: fan an event out to every receiver at once
//!
//! Two lanes feed one task. System events and frozen-event replays use the
//! expedited lane, which is always drained first.

use crate::adapters::BrokerAdapters;
use crate::context::{DispatchContext, Route};
use crate::delivery::{DeliverySnapshot, UnorderedDeliveryRecord};
use crate::error::BrokerError;
use crate::registry::{FrozenEvents, SubscriberRef, SubscriberRegistry};
use ces_core::{Clock, EventRecord, ALL_USER};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};

type Pending = Arc<Mutex<Vec<UnorderedDeliveryRecord>>>;

fn lock(pending: &Pending) -> MutexGuard<'_, Vec<UnorderedDeliveryRecord>> {
    pending.lock().unwrap_or_else(|e| e.into_inner())
}

enum UnorderedTask {
    /// Deliver the pending record with this id
    Deliver(u64),
    /// Deliver a previously frozen event to one subscriber
    Replay {
        subscriber: SubscriberRef,
        record: EventRecord,
    },
    Flush(oneshot::Sender<()>),
}

/// Handle to the unordered dispatch loop
pub struct UnorderedDispatcher<A: BrokerAdapters> {
    registry: Arc<SubscriberRegistry<A>>,
    pending: Pending,
    expedited: mpsc::UnboundedSender<UnorderedTask>,
    normal: mpsc::UnboundedSender<UnorderedTask>,
    next_id: AtomicU64,
}

impl<A: BrokerAdapters> UnorderedDispatcher<A> {
    pub(crate) fn start<C: Clock>(ctx: Arc<DispatchContext<A, C>>, runtime: &Handle) -> Self {
        let (expedited, expedited_rx) = mpsc::unbounded_channel();
        let (normal, normal_rx) = mpsc::unbounded_channel();
        let pending = Pending::default();
        let registry = ctx.registry.clone();
        let dispatch = UnorderedLoop {
            ctx,
            pending: pending.clone(),
        };
        runtime.spawn(dispatch.run(expedited_rx, normal_rx));
        Self {
            registry,
            pending,
            expedited,
            normal,
            next_id: AtomicU64::new(0),
        }
    }

    /// Queue an event for every matching subscriber, or for `only` when
    /// given. Returns the receiver count.
    pub fn dispatch(
        &self,
        event: EventRecord,
        only: Option<SubscriberRef>,
    ) -> Result<usize, BrokerError> {
        let receivers = match only {
            Some(subscriber) => vec![subscriber],
            None => self.registry.match_event(&event),
        };
        let count = receivers.len();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let expedite = event.is_system_event;
        tracing::debug!(
            event = event.action(),
            receivers = count,
            expedite,
            "unordered event queued"
        );
        lock(&self.pending).push(UnorderedDeliveryRecord::new(id, event, receivers));

        let lane = if expedite { &self.expedited } else { &self.normal };
        if lane.send(UnorderedTask::Deliver(id)).is_err() {
            lock(&self.pending).retain(|r| r.id != id);
            return Err(BrokerError::Stopped);
        }
        Ok(count)
    }

    /// Queue frozen events for redelivery, ahead of ordinary traffic
    pub fn replay(&self, frozen: FrozenEvents) -> Result<usize, BrokerError> {
        let mut queued = 0;
        for (subscriber, records) in frozen {
            for record in records {
                self.expedited
                    .send(UnorderedTask::Replay {
                        subscriber: subscriber.clone(),
                        record,
                    })
                    .map_err(|_| BrokerError::Stopped)?;
                queued += 1;
            }
        }
        if queued > 0 {
            tracing::debug!(queued, "frozen events queued for replay");
        }
        Ok(queued)
    }

    /// Records not yet dispatched, oldest first
    pub fn pending(&self, event: &str, user_id: i32) -> Vec<DeliverySnapshot> {
        lock(&self.pending)
            .iter()
            .filter(|r| event.is_empty() || r.event.action() == event)
            .filter(|r| user_id == ALL_USER || r.event.user_id == user_id)
            .map(UnorderedDeliveryRecord::snapshot)
            .collect()
    }

    /// Resolves once both lanes have drained everything queued before the call
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.normal.send(UnorderedTask::Flush(done)).is_ok() {
            let _ = wait.await;
        }
    }
}

struct UnorderedLoop<A: BrokerAdapters, C: Clock> {
    ctx: Arc<DispatchContext<A, C>>,
    pending: Pending,
}

impl<A: BrokerAdapters, C: Clock> UnorderedLoop<A, C> {
    async fn run(
        self,
        mut expedited: mpsc::UnboundedReceiver<UnorderedTask>,
        mut normal: mpsc::UnboundedReceiver<UnorderedTask>,
    ) {
        tracing::debug!("unordered dispatch loop started");
        loop {
            tokio::select! {
                biased;
                Some(task) = expedited.recv() => self.handle(task),
                Some(task) = normal.recv() => self.handle(task),
                else => break,
            }
        }
        tracing::debug!("unordered dispatch loop stopped");
    }

    fn handle(&self, task: UnorderedTask) {
        match task {
            UnorderedTask::Deliver(id) => self.deliver(id),
            UnorderedTask::Replay { subscriber, record } => self.replay(&subscriber, &record),
            UnorderedTask::Flush(done) => {
                let _ = done.send(());
            }
        }
    }

    fn deliver(&self, id: u64) {
        let mut record = {
            let mut pending = lock(&self.pending);
            match pending.iter().position(|r| r.id == id) {
                Some(index) => pending.remove(index),
                None => return,
            }
        };

        for (index, subscriber) in record.receivers.iter().enumerate() {
            let route = self.ctx.route(subscriber, &record.event);
            record.states[index] = route.state();
            if let Route::Deliver(listener) = route {
                listener.notify_event(&record.event.data, false, record.event.is_sticky());
            }
        }
        tracing::debug!(
            event = record.event.action(),
            receivers = record.receivers.len(),
            "unordered event delivered"
        );
        self.ctx.record_history(record.snapshot());
    }

    fn replay(&self, subscriber: &SubscriberRef, record: &EventRecord) {
        match self.ctx.route(subscriber, record) {
            Route::Deliver(listener) => {
                tracing::debug!(
                    event = record.action(),
                    listener = %listener.id(),
                    "frozen event replayed"
                );
                listener.notify_event(&record.data, false, record.is_sticky());
            }
            Route::Buffered => {
                tracing::debug!(
                    event = record.action(),
                    "subscriber refrozen, event buffered again"
                );
            }
            Route::Skipped => {}
        }
    }
}

#[cfg(test)]
#[path = "unordered_tests.rs"]
mod tests;
