// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ordered dispatch: one event at a time, one receiver at a time
//!
//! A single task owns the dispatch loop. Receivers are walked in priority
//! order; each one must finish (or time out) before the next is notified,
//! and its result code, data and abort flag carry over to the next receiver
//! and finally to the publisher's result listener.

use crate::adapters::BrokerAdapters;
use crate::context::{DispatchContext, Route};
use crate::delivery::{DeliverySnapshot, DeliveryState, DispatchState, OrderedDeliveryRecord};
use crate::error::BrokerError;
use crate::registry::{SubscriberRef, SubscriberRegistry};
use ces_adapters::{TelemetryEvent, TelemetryOrigin, TelemetrySink};
use ces_core::{Clock, EventRecord, ListenerHandle, ListenerId, ALL_USER};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Instant};

type Queue = Arc<Mutex<VecDeque<OrderedDeliveryRecord>>>;

fn lock(queue: &Queue) -> MutexGuard<'_, VecDeque<OrderedDeliveryRecord>> {
    queue.lock().unwrap_or_else(|e| e.into_inner())
}

pub(crate) enum OrderedCommand {
    Schedule,
    Finish {
        listener: ListenerId,
        code: i32,
        data: String,
        abort: bool,
    },
    ReceiverGone {
        listener: ListenerId,
    },
    Flush(oneshot::Sender<()>),
}

/// Handle to the ordered dispatch loop
pub struct OrderedDispatchEngine<A: BrokerAdapters> {
    registry: Arc<SubscriberRegistry<A>>,
    queue: Queue,
    tx: mpsc::UnboundedSender<OrderedCommand>,
}

impl<A: BrokerAdapters> OrderedDispatchEngine<A> {
    /// Spawn the dispatch loop on `runtime`
    pub(crate) fn start<C: Clock>(
        ctx: Arc<DispatchContext<A, C>>,
        timeout: Duration,
        runtime: &Handle,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let queue = Queue::default();
        let registry = ctx.registry.clone();
        let dispatch = OrderedLoop {
            ctx,
            queue: queue.clone(),
            self_tx: tx.downgrade(),
            timeout,
            deadline: None,
            scheduled: false,
        };
        runtime.spawn(dispatch.run(rx));
        Self {
            registry,
            queue,
            tx,
        }
    }

    /// Snapshot the matching receivers and queue the event behind any
    /// ordered event already in flight. Returns the receiver count.
    pub fn enqueue(
        &self,
        event: EventRecord,
        result_to: Option<ListenerHandle>,
    ) -> Result<usize, BrokerError> {
        let receivers = self.registry.match_event(&event);
        let count = receivers.len();
        tracing::debug!(event = event.action(), receivers = count, "ordered event queued");
        lock(&self.queue).push_back(OrderedDeliveryRecord::new(event, receivers, result_to));
        self.send(OrderedCommand::Schedule)?;
        Ok(count)
    }

    /// Result from the receiver currently holding the head event.
    ///
    /// Ignored unless `listener` is that receiver.
    pub fn finish_receiver(
        &self,
        listener: &ListenerId,
        code: i32,
        data: String,
        abort: bool,
    ) -> Result<(), BrokerError> {
        self.send(OrderedCommand::Finish {
            listener: listener.clone(),
            code,
            data,
            abort,
        })
    }

    /// A receiver went away; if it holds the head event, finish it with the
    /// current result and move on.
    pub fn receiver_gone(&self, listener: &ListenerId) -> Result<(), BrokerError> {
        self.send(OrderedCommand::ReceiverGone {
            listener: listener.clone(),
        })
    }

    /// Queued records, head first
    pub fn pending(&self, event: &str, user_id: i32) -> Vec<DeliverySnapshot> {
        lock(&self.queue)
            .iter()
            .filter(|r| event.is_empty() || r.event.action() == event)
            .filter(|r| user_id == ALL_USER || r.event.user_id == user_id)
            .map(OrderedDeliveryRecord::snapshot)
            .collect()
    }

    pub fn len(&self) -> usize {
        lock(&self.queue).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolves once every command sent before this call has been handled
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.send(OrderedCommand::Flush(done)).is_ok() {
            let _ = wait.await;
        }
    }

    fn send(&self, command: OrderedCommand) -> Result<(), BrokerError> {
        self.tx.send(command).map_err(|_| BrokerError::Stopped)
    }
}

enum Step {
    Finalize(OrderedDeliveryRecord),
    Deliver {
        index: usize,
        subscriber: SubscriberRef,
        event: EventRecord,
    },
}

/// Marks the awaited receiver of `record` timed out and returns it
fn time_out_current(record: &mut OrderedDeliveryRecord) -> Option<SubscriberRef> {
    if record.state != DispatchState::AwaitingReceiverAck {
        return None;
    }
    record.state = DispatchState::Idle;
    record.current = None;
    let index = record.next_receiver.checked_sub(1)?;
    if let Some(state) = record.states.get_mut(index) {
        *state = DeliveryState::TimedOut;
    }
    record.receivers.get(index).cloned()
}

struct OrderedLoop<A: BrokerAdapters, C: Clock> {
    ctx: Arc<DispatchContext<A, C>>,
    queue: Queue,
    self_tx: mpsc::WeakUnboundedSender<OrderedCommand>,
    timeout: Duration,
    deadline: Option<Instant>,
    scheduled: bool,
}

impl<A: BrokerAdapters, C: Clock> OrderedLoop<A, C> {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<OrderedCommand>) {
        tracing::debug!(
            timeout_ms = self.timeout.as_millis() as u64,
            "ordered dispatch loop started"
        );
        loop {
            let deadline = self.deadline;
            let expiry = time::sleep_until(deadline.unwrap_or_else(Instant::now));
            tokio::select! {
                command = rx.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
                _ = expiry, if deadline.is_some() => {
                    self.deadline = None;
                    self.on_timeout();
                }
            }
        }
        tracing::debug!("ordered dispatch loop stopped");
    }

    fn handle(&mut self, command: OrderedCommand) {
        match command {
            OrderedCommand::Schedule => {
                self.scheduled = false;
                self.process_next();
            }
            OrderedCommand::Finish {
                listener,
                code,
                data,
                abort,
            } => self.finish_current(&listener, Some((code, data, abort))),
            OrderedCommand::ReceiverGone { listener } => self.finish_current(&listener, None),
            OrderedCommand::Flush(done) => {
                let _ = done.send(());
            }
        }
    }

    /// Queue a `Schedule` to ourselves, at most one outstanding
    fn schedule(&mut self) {
        if self.scheduled {
            return;
        }
        if let Some(tx) = self.self_tx.upgrade() {
            self.scheduled = tx.send(OrderedCommand::Schedule).is_ok();
        }
    }

    /// Advance the head record until a receiver is awaited or the queue
    /// is empty.
    fn process_next(&mut self) {
        loop {
            let now = Instant::now();
            let mut overdue = None;
            let step = {
                let mut queue = lock(&self.queue);
                let Some(head) = queue.front_mut() else {
                    self.deadline = None;
                    return;
                };

                let count = head.receivers.len();
                let receivers = u32::try_from(count).unwrap_or(u32::MAX);
                let budget = self.timeout.saturating_mul(receivers.saturating_mul(2));
                let forced = count > 0
                    && head
                        .dispatch_started
                        .is_some_and(|started| now > started + budget);
                if forced {
                    let action = head.event.action().to_string();
                    overdue = time_out_current(head).map(|r| (r, action));
                    head.state = DispatchState::Idle;
                    head.current = None;
                }
                if head.state != DispatchState::Idle {
                    return;
                }

                if count == 0 || head.next_receiver >= count || head.aborted || forced {
                    match queue.pop_front() {
                        Some(record) => Step::Finalize(record),
                        None => return,
                    }
                } else {
                    let index = head.next_receiver;
                    head.next_receiver += 1;
                    let wall = self.ctx.clock.now();
                    head.receiver_started = Some(now);
                    head.receiver_time = Some(wall);
                    if index == 0 {
                        head.dispatch_started = Some(now);
                        head.dispatch_time = Some(wall);
                    }
                    Step::Deliver {
                        index,
                        subscriber: head.receivers[index].clone(),
                        event: head.event.clone(),
                    }
                }
            };

            if let Some((receiver, action)) = overdue {
                self.report_timeout(&receiver, &action);
            }
            match step {
                Step::Finalize(record) => self.finalize(record),
                Step::Deliver {
                    index,
                    subscriber,
                    event,
                } => {
                    if self.deliver(index, &subscriber, &event) {
                        return;
                    }
                }
            }
        }
    }

    /// Returns true if the receiver was notified and is now awaited
    fn deliver(&mut self, index: usize, subscriber: &SubscriberRef, event: &EventRecord) -> bool {
        let route = self.ctx.route(subscriber, event);
        let Route::Deliver(listener) = route else {
            self.update_head(index, route.state(), None);
            return false;
        };

        self.update_head(index, DeliveryState::Delivered, Some(listener.id().clone()));
        self.deadline = Some(Instant::now() + self.timeout);
        tracing::debug!(
            event = event.action(),
            receiver = %listener.id(),
            index,
            "ordered event delivered"
        );
        listener.notify_event(&event.data, true, event.is_sticky());
        true
    }

    fn update_head(&self, index: usize, state: DeliveryState, awaited: Option<ListenerId>) {
        let mut queue = lock(&self.queue);
        let Some(head) = queue.front_mut() else {
            return;
        };
        if let Some(slot) = head.states.get_mut(index) {
            *slot = state;
        }
        if let Some(id) = awaited {
            head.current = Some(id);
            head.state = DispatchState::AwaitingReceiverAck;
        }
    }

    fn finalize(&mut self, record: OrderedDeliveryRecord) {
        self.deadline = None;
        let snapshot = record.snapshot();
        if let Some(result_to) = &record.result_to {
            result_to.notify_event(&record.event.data, true, record.event.is_sticky());
        }
        tracing::debug!(
            event = record.event.action(),
            receivers = record.receivers.len(),
            code = record.event.data.code,
            aborted = record.aborted,
            "ordered event finished"
        );
        self.ctx.record_history(snapshot);
    }

    fn finish_current(&mut self, listener: &ListenerId, result: Option<(i32, String, bool)>) {
        let advance = {
            let mut queue = lock(&self.queue);
            let Some(head) = queue
                .front_mut()
                .filter(|head| head.current.as_ref() == Some(listener))
            else {
                tracing::debug!(listener = %listener, "no ordered event awaiting this receiver");
                return;
            };
            if let Some((code, data, abort)) = result {
                head.event.data.code = code;
                head.event.data.data = data;
                head.aborted = abort;
            }
            let awaiting = head.state == DispatchState::AwaitingReceiverAck;
            head.state = DispatchState::Idle;
            head.current = None;
            awaiting
        };
        if advance {
            self.deadline = None;
            self.process_next();
        }
    }

    fn on_timeout(&mut self) {
        let now = Instant::now();
        let timed_out = {
            let mut queue = lock(&self.queue);
            let Some(head) = queue.front_mut() else {
                return;
            };
            if head.state != DispatchState::AwaitingReceiverAck {
                return;
            }
            if let Some(due) = head.receiver_started.map(|started| started + self.timeout) {
                if due > now {
                    self.deadline = Some(due);
                    return;
                }
            }
            let action = head.event.action().to_string();
            time_out_current(head).map(|r| (r, action))
        };
        if let Some((receiver, action)) = timed_out {
            self.report_timeout(&receiver, &action);
        }
        self.schedule();
    }

    fn report_timeout(&self, receiver: &SubscriberRef, event: &str) {
        tracing::warn!(
            event,
            receiver = %receiver.caller(),
            timeout_ms = self.timeout.as_millis() as u64,
            "ordered receiver timed out"
        );
        self.ctx
            .adapters
            .telemetry()
            .emit(TelemetryEvent::OrderedTimeout {
                event: event.to_string(),
                receiver: TelemetryOrigin::from(receiver.caller()),
            });
    }
}

#[cfg(test)]
#[path = "ordered_tests.rs"]
mod tests;
