// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! State shared by the ordered and unordered dispatch loops

use crate::adapters::BrokerAdapters;
use crate::delivery::{DeliverySnapshot, DeliveryState};
use crate::history::History;
use crate::permission::{PermissionGate, PermissionTable};
use crate::registry::{SubscriberRef, SubscriberRegistry};
use ces_core::{BrokerConfig, Clock, EventRecord, ListenerHandle, ListenerId};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// What to do with one receiver of one event
pub(crate) enum Route {
    /// Denied, removed, or its listener is gone
    Skipped,
    /// Withheld until the receiver's uid is unfrozen
    Buffered,
    Deliver(ListenerHandle),
}

impl Route {
    pub(crate) fn state(&self) -> DeliveryState {
        match self {
            Route::Deliver(_) => DeliveryState::Delivered,
            Route::Skipped | Route::Buffered => DeliveryState::Skipped,
        }
    }
}

pub(crate) struct DispatchContext<A: BrokerAdapters, C: Clock> {
    pub(crate) registry: Arc<SubscriberRegistry<A>>,
    pub(crate) gate: PermissionGate<A::Identity>,
    pub(crate) history: Arc<Mutex<History>>,
    pub(crate) adapters: A,
    pub(crate) clock: C,
}

impl<A: BrokerAdapters, C: Clock> DispatchContext<A, C> {
    pub(crate) fn new(
        adapters: A,
        clock: C,
        config: &BrokerConfig,
        permissions: PermissionTable,
        death_tx: mpsc::UnboundedSender<ListenerId>,
    ) -> Self {
        Self {
            registry: Arc::new(SubscriberRegistry::new(adapters.clone(), config, death_tx)),
            gate: PermissionGate::new(adapters.identity().clone(), Arc::new(permissions)),
            history: Arc::new(Mutex::new(History::new(config.history_capacity))),
            adapters,
            clock,
        }
    }

    /// Gate, then freeze check, then listener liveness
    pub(crate) fn route(&self, subscriber: &SubscriberRef, event: &EventRecord) -> Route {
        if subscriber.is_removed() {
            return Route::Skipped;
        }
        if self.gate.check(subscriber, event) == DeliveryState::Skipped {
            return Route::Skipped;
        }
        if subscriber.is_frozen() && self.registry.buffer_frozen(subscriber, event.clone()) {
            return Route::Buffered;
        }
        if subscriber.is_removed() {
            return Route::Skipped;
        }
        match subscriber.listener() {
            Some(listener) => {
                if self.gate.table().is_sensitive(event.action()) {
                    tracing::info!(
                        event = event.action(),
                        subscriber = %subscriber.caller(),
                        "sensitive permission used"
                    );
                }
                Route::Deliver(listener)
            }
            None => {
                tracing::debug!(listener = %subscriber.id(), "listener dropped, skipping");
                Route::Skipped
            }
        }
    }

    pub(crate) fn record_history(&self, snapshot: DeliverySnapshot) {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(snapshot);
    }
}
