// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event broker: the public entry point
//!
//! Validates callers, routes publishes to the ordered or unordered path,
//! keeps the sticky cache, and answers diagnostics. Cheap to clone; every
//! clone talks to the same dispatch loops.

use crate::access::{check_user_id, resolve_caller};
use crate::adapters::BrokerAdapters;
use crate::context::DispatchContext;
use crate::delivery::ReceiverSnapshot;
use crate::dump::{self, DumpKind, HIDUMP_HELP};
use crate::error::{BrokerError, RegistryError};
use crate::history::History;
use crate::ordered::OrderedDispatchEngine;
use crate::permission::{PermissionTable, STICKY_PERMISSION};
use crate::registry::SubscriberRegistry;
use crate::sticky::StickyEventCache;
use crate::unordered::UnorderedDispatcher;
use ces_adapters::{
    IdentityResolver, StaticSubscriberAdapter, TelemetryEvent, TelemetryOrigin, TelemetrySink,
};
use ces_core::support::names;
use ces_core::{
    BrokerConfig, CallerIdentity, Clock, CommonEventData, EventRecord, EventRecordInfo,
    EventSupport, ListenerHandle, ListenerId, PublishInfo, SubscribeInfo, SystemClock, Uid,
    ALL_USER,
};
use std::sync::{Arc, Mutex, Weak};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::time::Instant;

struct BrokerInner<A: BrokerAdapters, C: Clock> {
    adapters: A,
    clock: C,
    config: BrokerConfig,
    support: EventSupport,
    registry: Arc<SubscriberRegistry<A>>,
    sticky: StickyEventCache,
    history: Arc<Mutex<History>>,
    ordered: OrderedDispatchEngine<A>,
    unordered: UnorderedDispatcher<A>,
    runtime: Handle,
    last_publish_report: Mutex<Option<Instant>>,
}

/// In-process publish/subscribe broker
pub struct EventBroker<A: BrokerAdapters, C: Clock = SystemClock> {
    inner: Arc<BrokerInner<A, C>>,
}

impl<A: BrokerAdapters, C: Clock> Clone for EventBroker<A, C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<A: BrokerAdapters, C: Clock> EventBroker<A, C> {
    /// Start the broker with the built-in event and permission tables.
    ///
    /// Must be called from within a Tokio runtime; the dispatch loops are
    /// spawned onto it.
    pub fn start(adapters: A, clock: C, config: BrokerConfig) -> Result<Self, BrokerError> {
        Self::start_with(
            adapters,
            clock,
            config,
            EventSupport::default(),
            PermissionTable::default(),
        )
    }

    pub fn start_with(
        adapters: A,
        clock: C,
        config: BrokerConfig,
        support: EventSupport,
        permissions: PermissionTable,
    ) -> Result<Self, BrokerError> {
        let runtime = Handle::try_current().map_err(|_| BrokerError::NoRuntime)?;

        let (death_tx, death_rx) = mpsc::unbounded_channel();
        let ctx = Arc::new(DispatchContext::new(
            adapters.clone(),
            clock.clone(),
            &config,
            permissions,
            death_tx,
        ));
        let registry = ctx.registry.clone();
        let history = ctx.history.clone();
        let ordered = OrderedDispatchEngine::start(ctx.clone(), config.receiver_timeout, &runtime);
        let unordered = UnorderedDispatcher::start(ctx, &runtime);

        tracing::info!(
            receiver_timeout_ms = config.receiver_timeout.as_millis() as u64,
            history_capacity = config.history_capacity,
            "event broker started"
        );

        let inner = Arc::new(BrokerInner {
            adapters,
            clock,
            config,
            support,
            registry,
            sticky: StickyEventCache::new(),
            history,
            ordered,
            unordered,
            runtime: runtime.clone(),
            last_publish_report: Mutex::new(None),
        });
        runtime.spawn(watch_deaths(Arc::downgrade(&inner), death_rx));
        Ok(Self { inner })
    }

    pub fn config(&self) -> &BrokerConfig {
        &self.inner.config
    }

    /// Register `listener` for the events in `info`.
    ///
    /// Cached sticky events the subscriber matches are replayed to it right
    /// away.
    pub fn subscribe(
        &self,
        mut info: SubscribeInfo,
        listener: &ListenerHandle,
        caller: &CallerIdentity,
    ) -> Result<(), BrokerError> {
        if info.events().is_empty() {
            return Err(RegistryError::InvalidFilter.into());
        }
        let identity = self.inner.adapters.identity();
        let caller = resolve_caller(identity, caller);
        info.user_id = check_user_id(identity, &caller, info.user_id)?;

        let events = info.events().to_vec();
        let user_id = info.user_id;
        let subscriber =
            self.inner
                .registry
                .insert(info, listener, caller.clone(), self.inner.clock.now())?;

        for mut record in self.inner.sticky.find(&events) {
            if record.excludes_bundle(&caller.bundle_name) {
                continue;
            }
            record.publish_info.ordered = false;
            self.inner.unordered.dispatch(record, Some(subscriber.clone()))?;
        }

        tracing::info!(
            listener = %listener.id(),
            subscriber = %caller,
            events = %events.join(","),
            user_id,
            "subscribed"
        );
        self.inner
            .adapters
            .telemetry()
            .emit(TelemetryEvent::Subscribe {
                events,
                user_id,
                origin: TelemetryOrigin::from(&caller),
            });
        Ok(())
    }

    /// Remove a subscription. An ordered event currently awaiting this
    /// listener moves on to its next receiver.
    pub fn unsubscribe(&self, listener: &ListenerId) -> Result<(), BrokerError> {
        let subscriber = self.inner.registry.remove(listener).map_err(|e| match e {
            RegistryError::NotFound(id) => BrokerError::NotFound(id),
            other => other.into(),
        })?;
        self.inner.ordered.receiver_gone(listener)?;

        tracing::info!(listener = %listener, subscriber = %subscriber.caller(), "unsubscribed");
        self.inner
            .adapters
            .telemetry()
            .emit(TelemetryEvent::Unsubscribe {
                events: subscriber.info().events().to_vec(),
                user_id: subscriber.user_id(),
                origin: TelemetryOrigin::from(subscriber.caller()),
            });
        Ok(())
    }

    /// Publish an event.
    ///
    /// `result_to` is only allowed for ordered publishes; it receives the
    /// final result after the last receiver.
    pub fn publish(
        &self,
        data: CommonEventData,
        info: PublishInfo,
        result_to: Option<ListenerHandle>,
        caller: &CallerIdentity,
        user_id: i32,
    ) -> Result<(), BrokerError> {
        let action = data.action().to_string();
        if action.is_empty() {
            return Err(BrokerError::InvalidArgument("event name is empty".to_string()));
        }
        if result_to.is_some() && !info.ordered {
            return Err(BrokerError::InvalidArgument(
                "result listener requires an ordered publish".to_string(),
            ));
        }

        let identity = self.inner.adapters.identity();
        let publisher = resolve_caller(identity, caller);
        let user_id = match check_user_id(identity, &publisher, user_id) {
            Ok(user_id) => user_id,
            Err(e) => {
                self.report_publish_error(&action, &publisher, &e.to_string());
                return Err(e);
            }
        };

        let is_system_event = self.inner.support.is_system_event(&action);
        if is_system_event && !publisher.is_subsystem && !publisher.is_system_app {
            let reason = format!("{publisher} may not publish system event {action}");
            self.report_publish_error(&action, &publisher, &reason);
            return Err(BrokerError::Unauthorized(reason));
        }

        let record = EventRecord {
            data,
            publish_info: info,
            record_time: self.inner.clock.now(),
            publisher,
            user_id,
            is_system_event,
        };
        self.forward_to_static(&record);

        if record.is_sticky() {
            self.update_sticky(&record)?;
        }
        self.route(record.clone(), result_to.clone())?;

        if let Some(alias) = self.inner.support.mapped_alias(&action) {
            tracing::debug!(event = %action, alias, "republishing under legacy name");
            self.route(record.renamed(alias), result_to)?;
        }

        self.report_publish(&record);
        Ok(())
    }

    /// Result from an ordered receiver. Ignored unless `listener` is the
    /// receiver the head ordered event is waiting on.
    pub fn finish_receiver(
        &self,
        listener: &ListenerId,
        code: i32,
        data: impl Into<String>,
        abort: bool,
    ) -> Result<(), BrokerError> {
        self.inner
            .ordered
            .finish_receiver(listener, code, data.into(), abort)
    }

    /// Payload of the cached sticky event, if any
    pub fn get_sticky(&self, event: &str) -> Option<CommonEventData> {
        self.inner.sticky.get(event).map(|record| record.data)
    }

    /// Withhold deliveries from every subscriber owned by `uid`
    pub fn freeze(&self, uid: Uid) {
        self.inner
            .registry
            .set_freeze(uid, true, self.inner.clock.now());
    }

    /// Resume deliveries to `uid` and replay what was withheld
    pub fn unfreeze(&self, uid: Uid) -> Result<(), BrokerError> {
        self.inner
            .registry
            .set_freeze(uid, false, self.inner.clock.now());
        let frozen = self.inner.registry.drain_frozen(uid);
        self.inner.unordered.replay(frozen)?;
        Ok(())
    }

    pub fn unfreeze_all(&self) -> Result<(), BrokerError> {
        self.inner
            .registry
            .set_freeze_all(false, self.inner.clock.now());
        let frozen = self.inner.registry.drain_all_frozen();
        self.inner.unordered.replay(frozen)?;
        Ok(())
    }

    /// Diagnostics for one event (empty for all) and one user (`ALL_USER`
    /// for all)
    pub fn dump(&self, event: &str, user_id: i32, kind: DumpKind) -> Vec<String> {
        let wants = |section: DumpKind| kind == DumpKind::All || kind == section;
        let mut sections = Vec::new();
        if wants(DumpKind::Subscribers) {
            let receivers: Vec<ReceiverSnapshot> = self
                .inner
                .registry
                .dump_subscribers(event, user_id)
                .iter()
                .map(ReceiverSnapshot::from)
                .collect();
            sections.push(dump::subscribers(&receivers));
        }
        if wants(DumpKind::Sticky) {
            sections.push(dump::sticky(&self.inner.sticky.records(event, user_id)));
        }
        if wants(DumpKind::Pending) {
            let mut pending = self.inner.unordered.pending(event, user_id);
            pending.extend(self.inner.ordered.pending(event, user_id));
            sections.push(dump::pending(&pending));
        }
        if wants(DumpKind::History) {
            let history = self
                .inner
                .history
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .filtered(event, user_id);
            sections.push(dump::history(&history));
        }
        sections
    }

    /// Command-line style diagnostics: `-h`, `-a`, or `-e <event>`
    pub fn hidump(&self, args: &[&str]) -> String {
        const UNKNOWN: &str = "error: unknown option.";
        let (command, value) = match args {
            [command] => (*command, None),
            [command, value] => (*command, Some(*value)),
            _ => return UNKNOWN.to_string(),
        };
        let event = match command {
            "-h" | "--help" => return HIDUMP_HELP.to_string(),
            "-a" | "--all" => "",
            "-e" | "--event" => match value {
                Some(event) => event,
                None => return "error: request a event value.".to_string(),
            },
            _ => return UNKNOWN.to_string(),
        };
        self.dump(event, ALL_USER, DumpKind::All)
            .into_iter()
            .map(|section| section + "\n")
            .collect()
    }

    /// Wait until both dispatch loops have handled everything queued
    /// before this call
    pub async fn flush(&self) {
        self.inner.unordered.flush().await;
        self.inner.ordered.flush().await;
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.registry.len()
    }

    /// Events currently withheld from `uid`
    pub fn frozen_event_count(&self, uid: Uid) -> usize {
        self.inner.registry.frozen_count(uid)
    }

    fn route(
        &self,
        record: EventRecord,
        result_to: Option<ListenerHandle>,
    ) -> Result<usize, BrokerError> {
        if record.is_ordered() {
            self.inner.ordered.enqueue(record, result_to)
        } else {
            self.inner.unordered.dispatch(record, None)
        }
    }

    fn update_sticky(&self, record: &EventRecord) -> Result<(), BrokerError> {
        let publisher = &record.publisher;
        let allowed = (publisher.is_system_app
            && self
                .inner
                .adapters
                .identity()
                .verify_token(publisher.token_id, STICKY_PERMISSION)
                .unwrap_or(false))
            || (!publisher.is_proxy && publisher.is_subsystem);
        if !allowed {
            let reason = format!("{publisher} may not publish sticky events");
            self.report_publish_error(record.action(), publisher, &reason);
            return Err(BrokerError::Unauthorized(reason));
        }
        self.inner.sticky.update(record.action(), record.clone());
        Ok(())
    }

    fn forward_to_static(&self, record: &EventRecord) {
        let adapter = self.inner.adapters.static_subscribers().clone();
        let record = record.clone();
        self.inner.runtime.spawn(async move {
            if let Err(e) = adapter.publish(&record).await {
                tracing::warn!(
                    event = record.action(),
                    error = %e,
                    "static subscriber forward failed"
                );
            }
        });
    }

    fn report_publish_error(&self, event: &str, publisher: &EventRecordInfo, reason: &str) {
        tracing::warn!(event, publisher = %publisher, reason, "publish rejected");
        self.inner
            .adapters
            .telemetry()
            .emit(TelemetryEvent::PublishError {
                event: event.to_string(),
                reason: reason.to_string(),
                origin: TelemetryOrigin::from(publisher),
            });
    }

    /// Usage telemetry, at most once per report interval
    fn report_publish(&self, record: &EventRecord) {
        if record.action() == names::TIME_TICK {
            return;
        }
        let now = Instant::now();
        {
            let mut last = self
                .inner
                .last_publish_report
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            let interval = self.inner.config.publish_report_interval;
            if last.is_some_and(|at| now.duration_since(at) < interval) {
                return;
            }
            *last = Some(now);
        }
        self.inner
            .adapters
            .telemetry()
            .emit(TelemetryEvent::Publish {
                event: record.action().to_string(),
                user_id: record.user_id,
                origin: TelemetryOrigin::from(&record.publisher),
            });
    }
}

/// Unsubscribe listeners whose process died, until the broker is dropped
async fn watch_deaths<A: BrokerAdapters, C: Clock>(
    inner: Weak<BrokerInner<A, C>>,
    mut deaths: mpsc::UnboundedReceiver<ListenerId>,
) {
    while let Some(id) = deaths.recv().await {
        let Some(inner) = inner.upgrade() else {
            break;
        };
        let broker = EventBroker { inner };
        match broker.unsubscribe(&id) {
            Ok(()) => tracing::info!(listener = %id, "listener died, unsubscribed"),
            Err(BrokerError::NotFound(_)) => {
                tracing::debug!(listener = %id, "dead listener already unsubscribed")
            }
            Err(e) => {
                tracing::warn!(listener = %id, error = %e, "failed to unsubscribe dead listener")
            }
        }
    }
}

#[cfg(test)]
#[path = "broker_tests.rs"]
mod tests;
