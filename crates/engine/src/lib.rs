// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Common event broker engine
//!
//! Subscriber registry, permission gate, sticky cache, and the ordered and
//! unordered dispatch loops behind [`EventBroker`].

mod access;
mod adapters;
mod broker;
mod context;
mod delivery;
pub mod dump;
mod error;
mod history;
mod ordered;
mod permission;
mod registry;
mod sticky;
mod unordered;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use access::{check_user_id, resolve_caller};
pub use adapters::{BrokerAdapters, BrokerDeps, StandaloneDeps};
pub use broker::EventBroker;
pub use delivery::{DeliverySnapshot, DeliveryState, DispatchState, ReceiverSnapshot};
pub use dump::DumpKind;
pub use error::{BrokerError, RegistryError};
pub use history::History;
pub use ordered::OrderedDispatchEngine;
pub use permission::{
    EventPermission, PermissionGate, PermissionState, PermissionTable, STICKY_PERMISSION,
};
pub use registry::{is_visible, FrozenEvents, SubscriberRecord, SubscriberRef, SubscriberRegistry};
pub use sticky::StickyEventCache;
pub use unordered::UnorderedDispatcher;
