// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subscriber registry
//!
//! Owns every live subscription, indexed by event name (priority-sorted) and
//! by listener id, plus the per-uid buffers of events withheld from frozen
//! subscribers. All operations are short critical sections on one mutex; no
//! listener is ever called while it is held.

use crate::adapters::BrokerAdapters;
use crate::error::RegistryError;
use ces_adapters::{DeathRecipient, LivenessMonitor, TelemetryEvent, TelemetryOrigin, TelemetrySink};
use ces_core::{
    is_system_user, BrokerConfig, EventRecord, EventRecordInfo, ListenerHandle, ListenerId,
    SubscribeInfo, Uid, WeakListener, ALL_USER, UNDEFINED_USER,
};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::mpsc;

/// Shared handle to a subscription
pub type SubscriberRef = Arc<SubscriberRecord>;

#[derive(Debug, Clone, Copy, Default)]
struct FreezeState {
    frozen: bool,
    since: Option<DateTime<Utc>>,
}

/// One live subscription
#[derive(Debug)]
pub struct SubscriberRecord {
    info: SubscribeInfo,
    listener: WeakListener,
    caller: EventRecordInfo,
    record_time: DateTime<Utc>,
    seq: u64,
    freeze: Mutex<FreezeState>,
    removed: AtomicBool,
}

impl SubscriberRecord {
    pub fn id(&self) -> &ListenerId {
        self.listener.id()
    }

    /// Subscribe options, with the user id already resolved
    pub fn info(&self) -> &SubscribeInfo {
        &self.info
    }

    pub fn caller(&self) -> &EventRecordInfo {
        &self.caller
    }

    pub fn uid(&self) -> Uid {
        self.caller.uid
    }

    pub fn priority(&self) -> i32 {
        self.info.priority
    }

    pub fn user_id(&self) -> i32 {
        self.info.user_id
    }

    pub fn record_time(&self) -> DateTime<Utc> {
        self.record_time
    }

    /// Registration sequence number; orders subscribers of equal priority
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Strong listener handle, or `None` if the owner dropped it
    pub fn listener(&self) -> Option<ListenerHandle> {
        self.listener.upgrade()
    }

    pub fn is_frozen(&self) -> bool {
        self.freeze_state().frozen
    }

    pub fn freeze_time(&self) -> Option<DateTime<Utc>> {
        self.freeze_state().since
    }

    /// True once the subscription has been removed from the registry
    pub fn is_removed(&self) -> bool {
        self.removed.load(Ordering::SeqCst)
    }

    fn freeze_state(&self) -> FreezeState {
        *self.freeze.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_freeze(&self, frozen: bool, time: DateTime<Utc>) {
        let mut state = self.freeze.lock().unwrap_or_else(|e| e.into_inner());
        state.frozen = frozen;
        state.since = frozen.then_some(time);
    }
}

/// Whether a subscriber registered for `subscriber_user` sees an event
/// published for `target_user`.
///
/// `privileged_publisher` is a subsystem or system app calling directly.
pub fn is_visible(subscriber_user: i32, privileged_publisher: bool, target_user: i32) -> bool {
    if subscriber_user == ALL_USER {
        return true;
    }
    if privileged_publisher {
        target_user == UNDEFINED_USER
            || target_user == ALL_USER
            || subscriber_user == target_user
            || is_system_user(subscriber_user)
    } else {
        subscriber_user == target_user
    }
}

/// Events withheld from one subscriber while its uid was frozen
struct FrozenBucket {
    subscriber: SubscriberRef,
    events: VecDeque<EventRecord>,
}

/// Frozen events handed back for replay, per subscriber, in publish order
pub type FrozenEvents = Vec<(SubscriberRef, Vec<EventRecord>)>;

#[derive(Default)]
struct RegistryState {
    /// Registration order
    subscribers: Vec<SubscriberRef>,
    /// Priority descending, registration order among equals
    by_event: HashMap<String, Vec<SubscriberRef>>,
    by_listener: HashMap<ListenerId, SubscriberRef>,
    frozen_uids: HashMap<Uid, DateTime<Utc>>,
    frozen_events: HashMap<Uid, Vec<FrozenBucket>>,
    next_seq: u64,
}

pub struct SubscriberRegistry<A: BrokerAdapters> {
    adapters: A,
    max_events: usize,
    warn_threshold: usize,
    freeze_retention: Duration,
    death_tx: mpsc::UnboundedSender<ListenerId>,
    state: Mutex<RegistryState>,
}

impl<A: BrokerAdapters> SubscriberRegistry<A> {
    pub fn new(
        adapters: A,
        config: &BrokerConfig,
        death_tx: mpsc::UnboundedSender<ListenerId>,
    ) -> Self {
        Self {
            adapters,
            max_events: config.max_events_per_subscription,
            warn_threshold: config.subscriber_warn_threshold,
            freeze_retention: config.freeze_retention,
            death_tx,
            state: Mutex::new(RegistryState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a subscription and start watching the listener's liveness.
    ///
    /// Exceeding the per-event warning threshold is reported through
    /// telemetry but does not reject the subscription.
    pub fn insert(
        &self,
        info: SubscribeInfo,
        listener: &ListenerHandle,
        caller: EventRecordInfo,
        time: DateTime<Utc>,
    ) -> Result<SubscriberRef, RegistryError> {
        let count = info.events().len();
        if count == 0 {
            return Err(RegistryError::InvalidFilter);
        }
        if count > self.max_events {
            return Err(RegistryError::TooManyEvents {
                count,
                max: self.max_events,
            });
        }

        let mut exceeded = Vec::new();
        let record = {
            let mut state = self.lock();
            if state.by_listener.contains_key(listener.id()) {
                return Err(RegistryError::AlreadySubscribed(listener.id().clone()));
            }

            let seq = state.next_seq;
            state.next_seq += 1;
            let freeze = match state.frozen_uids.get(&caller.uid) {
                Some(since) => FreezeState {
                    frozen: true,
                    since: Some(*since),
                },
                None => FreezeState::default(),
            };
            let record = Arc::new(SubscriberRecord {
                info,
                listener: listener.downgrade(),
                caller,
                record_time: time,
                seq,
                freeze: Mutex::new(freeze),
                removed: AtomicBool::new(false),
            });

            for event in record.info.events() {
                let subscribers = state.by_event.entry(event.clone()).or_default();
                let at = subscribers.partition_point(|s| s.priority() >= record.priority());
                subscribers.insert(at, record.clone());
                if subscribers.len() > self.warn_threshold {
                    exceeded.push((event.clone(), subscribers.len()));
                }
            }
            state.subscribers.push(record.clone());
            state
                .by_listener
                .insert(record.id().clone(), record.clone());
            record
        };

        for (event, count) in exceeded {
            tracing::warn!(
                event = %event,
                count,
                threshold = self.warn_threshold,
                bundle = %record.caller.bundle_name,
                "subscriber count exceeds threshold"
            );
            self.adapters
                .telemetry()
                .emit(TelemetryEvent::SubscriberLimitExceeded {
                    event,
                    count,
                    threshold: self.warn_threshold,
                    origin: TelemetryOrigin::from(&record.caller),
                });
        }

        self.adapters
            .liveness()
            .watch(DeathRecipient::new(record.id().clone(), self.death_tx.clone()));

        tracing::debug!(
            listener = %record.id(),
            events = record.info.events().len(),
            priority = record.priority(),
            user_id = record.user_id(),
            "subscriber inserted"
        );
        Ok(record)
    }

    /// Remove a subscription, its frozen events, and its liveness watch
    pub fn remove(&self, id: &ListenerId) -> Result<SubscriberRef, RegistryError> {
        let record = {
            let mut state = self.lock();
            let record = state
                .by_listener
                .remove(id)
                .ok_or_else(|| RegistryError::NotFound(id.clone()))?;
            record.removed.store(true, Ordering::SeqCst);

            state.subscribers.retain(|s| s.id() != id);
            for event in record.info.events() {
                if let Some(subscribers) = state.by_event.get_mut(event) {
                    subscribers.retain(|s| s.id() != id);
                    if subscribers.is_empty() {
                        state.by_event.remove(event);
                    }
                }
            }
            if let Some(buckets) = state.frozen_events.get_mut(&record.uid()) {
                buckets.retain(|b| b.subscriber.id() != id);
                if buckets.is_empty() {
                    state.frozen_events.remove(&record.uid());
                }
            }
            record
        };

        self.adapters.liveness().unwatch(id);
        tracing::debug!(listener = %id, "subscriber removed");
        Ok(record)
    }

    pub fn get(&self, id: &ListenerId) -> Option<SubscriberRef> {
        self.lock().by_listener.get(id).cloned()
    }

    /// Subscribers that should receive `record`, highest priority first
    pub fn match_event(&self, record: &EventRecord) -> Vec<SubscriberRef> {
        let privileged = record.publisher.is_privileged();
        let state = self.lock();
        let Some(subscribers) = state.by_event.get(record.action()) else {
            return Vec::new();
        };
        subscribers
            .iter()
            .filter(|s| s.info.matching_skills.matches(&record.data.want))
            .filter(|s| !record.excludes_bundle(&s.caller.bundle_name))
            .filter(|s| is_visible(s.user_id(), privileged, record.user_id))
            .cloned()
            .collect()
    }

    /// Subscribers listed in diagnostics for an event / user filter.
    ///
    /// An empty event means every event; `ALL_USER` means every user.
    pub fn dump_subscribers(&self, event: &str, user_id: i32) -> Vec<SubscriberRef> {
        let state = self.lock();
        match (event.is_empty(), user_id == ALL_USER) {
            (true, true) => state.subscribers.clone(),
            (true, false) => state
                .subscribers
                .iter()
                .filter(|s| s.user_id() == user_id)
                .cloned()
                .collect(),
            (false, all_users) => state
                .by_event
                .get(event)
                .map(|subscribers| {
                    subscribers
                        .iter()
                        .filter(|s| all_users || is_visible(s.user_id(), true, user_id))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of subscriptions naming `event`
    pub fn subscriber_count(&self, event: &str) -> usize {
        self.lock().by_event.get(event).map_or(0, Vec::len)
    }

    /// Flip the freeze flag of every subscriber owned by `uid`
    pub fn set_freeze(&self, uid: Uid, frozen: bool, time: DateTime<Utc>) {
        let mut state = self.lock();
        if frozen {
            state.frozen_uids.insert(uid, time);
        } else {
            state.frozen_uids.remove(&uid);
        }
        let mut updated = 0usize;
        for subscriber in state.subscribers.iter().filter(|s| s.uid() == uid) {
            subscriber.set_freeze(frozen, time);
            updated += 1;
        }
        tracing::info!(uid, frozen, updated, "freeze state updated");
    }

    pub fn set_freeze_all(&self, frozen: bool, time: DateTime<Utc>) {
        let mut state = self.lock();
        state.frozen_uids.clear();
        let subscribers = state.subscribers.clone();
        for subscriber in &subscribers {
            subscriber.set_freeze(frozen, time);
            if frozen {
                state.frozen_uids.insert(subscriber.uid(), time);
            }
        }
        tracing::info!(frozen, updated = subscribers.len(), "all freeze states updated");
    }

    /// Withhold `record` from a frozen subscriber.
    ///
    /// Returns false without buffering when the subscriber was removed or
    /// unfrozen since the caller looked; the caller then delivers directly.
    /// When the buffered span (oldest to newest record time) exceeds the
    /// retention window, the single oldest entry is dropped.
    pub fn buffer_frozen(&self, subscriber: &SubscriberRef, record: EventRecord) -> bool {
        let mut state = self.lock();
        if subscriber.is_removed() || !subscriber.is_frozen() {
            return false;
        }
        let buckets = state.frozen_events.entry(subscriber.uid()).or_default();
        let bucket = match buckets
            .iter()
            .position(|b| b.subscriber.id() == subscriber.id())
        {
            Some(index) => &mut buckets[index],
            None => {
                buckets.push(FrozenBucket {
                    subscriber: subscriber.clone(),
                    events: VecDeque::new(),
                });
                let last = buckets.len() - 1;
                &mut buckets[last]
            }
        };
        tracing::debug!(
            listener = %subscriber.id(),
            event = record.action(),
            buffered = bucket.events.len() + 1,
            "event buffered for frozen subscriber"
        );
        bucket.events.push_back(record);

        let expired = match (bucket.events.front(), bucket.events.back()) {
            (Some(front), Some(back)) => (back.record_time - front.record_time)
                .to_std()
                .is_ok_and(|span| span > self.freeze_retention),
            _ => false,
        };
        if expired {
            if let Some(dropped) = bucket.events.pop_front() {
                tracing::debug!(
                    listener = %subscriber.id(),
                    event = dropped.action(),
                    "frozen event expired"
                );
            }
        }
        true
    }

    /// Take every event buffered for `uid`
    pub fn drain_frozen(&self, uid: Uid) -> FrozenEvents {
        let buckets = self.lock().frozen_events.remove(&uid).unwrap_or_default();
        Self::into_frozen_events(buckets)
    }

    /// Take every buffered event for every uid, lowest uid first
    pub fn drain_all_frozen(&self) -> FrozenEvents {
        let mut all: Vec<(Uid, Vec<FrozenBucket>)> =
            std::mem::take(&mut self.lock().frozen_events)
                .into_iter()
                .collect();
        all.sort_by_key(|(uid, _)| *uid);
        all.into_iter()
            .flat_map(|(_, buckets)| Self::into_frozen_events(buckets))
            .collect()
    }

    /// Number of events currently buffered for `uid`
    pub fn frozen_count(&self, uid: Uid) -> usize {
        self.lock()
            .frozen_events
            .get(&uid)
            .map_or(0, |buckets| buckets.iter().map(|b| b.events.len()).sum())
    }

    fn into_frozen_events(buckets: Vec<FrozenBucket>) -> FrozenEvents {
        buckets
            .into_iter()
            .filter(|b| !b.events.is_empty())
            .map(|b| (b.subscriber, b.events.into_iter().collect()))
            .collect()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
