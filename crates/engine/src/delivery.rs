// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Delivery records: one event on its way to a snapshot of receivers

use crate::registry::SubscriberRef;
use ces_core::{EventRecord, ListenerHandle, ListenerId, SubscribeInfo, Uid};
use chrono::{DateTime, Utc};
use std::fmt;
use tokio::time::Instant;

/// Per-receiver outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryState {
    Pending,
    Delivered,
    Skipped,
    TimedOut,
}

impl DeliveryState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryState::Pending => "PENDING",
            DeliveryState::Delivered => "DELIVERED",
            DeliveryState::Skipped => "SKIPPED",
            DeliveryState::TimedOut => "TIMEOUT",
        }
    }
}

impl fmt::Display for DeliveryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an ordered record is waiting on a receiver
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DispatchState {
    #[default]
    Idle,
    AwaitingReceiverAck,
}

impl DispatchState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchState::Idle => "IDLE",
            DispatchState::AwaitingReceiverAck => "AWAITING_RECEIVER_ACK",
        }
    }
}

impl fmt::Display for DispatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A receiver as it stood when the snapshot was taken
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiverSnapshot {
    pub id: ListenerId,
    pub info: SubscribeInfo,
    pub pid: i32,
    pub uid: Uid,
    pub bundle_name: String,
    pub record_time: DateTime<Utc>,
    pub is_frozen: bool,
    pub freeze_time: Option<DateTime<Utc>>,
}

impl From<&SubscriberRef> for ReceiverSnapshot {
    fn from(subscriber: &SubscriberRef) -> Self {
        Self {
            id: subscriber.id().clone(),
            info: subscriber.info().clone(),
            pid: subscriber.caller().pid,
            uid: subscriber.uid(),
            bundle_name: subscriber.caller().bundle_name.clone(),
            record_time: subscriber.record_time(),
            is_frozen: subscriber.is_frozen(),
            freeze_time: subscriber.freeze_time(),
        }
    }
}

/// Point-in-time view of a delivery record, used by history and dumps
#[derive(Debug, Clone, PartialEq)]
pub struct DeliverySnapshot {
    pub record: EventRecord,
    pub receivers: Vec<ReceiverSnapshot>,
    pub states: Vec<DeliveryState>,
    pub has_last_subscriber: bool,
    pub dispatch_state: DispatchState,
    pub dispatch_time: Option<DateTime<Utc>>,
    pub receiver_time: Option<DateTime<Utc>>,
    pub aborted: bool,
}

impl DeliverySnapshot {
    pub fn action(&self) -> &str {
        self.record.action()
    }

    /// Receivers paired with their outcome
    pub fn outcomes(&self) -> impl Iterator<Item = (&ReceiverSnapshot, DeliveryState)> {
        self.receivers.iter().zip(self.states.iter().copied())
    }
}

/// Unordered event waiting for its dispatch task
#[derive(Debug)]
pub struct UnorderedDeliveryRecord {
    pub(crate) id: u64,
    pub(crate) event: EventRecord,
    pub(crate) receivers: Vec<SubscriberRef>,
    pub(crate) states: Vec<DeliveryState>,
}

impl UnorderedDeliveryRecord {
    pub(crate) fn new(id: u64, event: EventRecord, receivers: Vec<SubscriberRef>) -> Self {
        let states = vec![DeliveryState::Pending; receivers.len()];
        Self {
            id,
            event,
            receivers,
            states,
        }
    }

    pub fn snapshot(&self) -> DeliverySnapshot {
        DeliverySnapshot {
            record: self.event.clone(),
            receivers: self.receivers.iter().map(ReceiverSnapshot::from).collect(),
            states: self.states.clone(),
            has_last_subscriber: false,
            dispatch_state: DispatchState::Idle,
            dispatch_time: None,
            receiver_time: None,
            aborted: false,
        }
    }
}

/// Ordered event walking its receiver chain
#[derive(Debug)]
pub struct OrderedDeliveryRecord {
    pub(crate) event: EventRecord,
    pub(crate) receivers: Vec<SubscriberRef>,
    pub(crate) states: Vec<DeliveryState>,
    pub(crate) next_receiver: usize,
    pub(crate) current: Option<ListenerId>,
    pub(crate) result_to: Option<ListenerHandle>,
    pub(crate) state: DispatchState,
    pub(crate) aborted: bool,
    pub(crate) dispatch_time: Option<DateTime<Utc>>,
    pub(crate) receiver_time: Option<DateTime<Utc>>,
    pub(crate) dispatch_started: Option<Instant>,
    pub(crate) receiver_started: Option<Instant>,
}

impl OrderedDeliveryRecord {
    pub(crate) fn new(
        event: EventRecord,
        receivers: Vec<SubscriberRef>,
        result_to: Option<ListenerHandle>,
    ) -> Self {
        let states = vec![DeliveryState::Pending; receivers.len()];
        Self {
            event,
            receivers,
            states,
            next_receiver: 0,
            current: None,
            result_to,
            state: DispatchState::Idle,
            aborted: false,
            dispatch_time: None,
            receiver_time: None,
            dispatch_started: None,
            receiver_started: None,
        }
    }

    pub fn snapshot(&self) -> DeliverySnapshot {
        DeliverySnapshot {
            record: self.event.clone(),
            receivers: self.receivers.iter().map(ReceiverSnapshot::from).collect(),
            states: self.states.clone(),
            has_last_subscriber: self.result_to.is_some(),
            dispatch_state: self.state,
            dispatch_time: self.dispatch_time,
            receiver_time: self.receiver_time,
            aborted: self.aborted,
        }
    }
}
