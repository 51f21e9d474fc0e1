// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake collaborators and fixtures for broker tests
#![cfg_attr(coverage_nightly, coverage(off))]

use crate::adapters::BrokerDeps;
use ces_adapters::{
    FakeIdentityResolver, FakeLivenessMonitor, FakeStaticSubscriberAdapter, FakeTelemetry,
};
use ces_core::{
    CallerIdentity, CommonEventData, EventRecord, EventRecordInfo, MatchingSkills, PublishInfo,
    SubscribeInfo, TokenId, Uid, Want,
};

/// Broker dependencies backed entirely by fakes
pub type FakeDeps = BrokerDeps<
    FakeIdentityResolver,
    FakeTelemetry,
    FakeStaticSubscriberAdapter,
    FakeLivenessMonitor,
>;

pub fn fake_deps() -> FakeDeps {
    BrokerDeps {
        identity: FakeIdentityResolver::new(),
        telemetry: FakeTelemetry::new(),
        static_subscribers: FakeStaticSubscriberAdapter::new(),
        liveness: FakeLivenessMonitor::new(),
    }
}

/// A directly calling app; the token id equals the uid
pub fn app(uid: Uid, bundle: &str) -> CallerIdentity {
    CallerIdentity::new(1000 + (uid % 1000) as i32, uid, uid as TokenId, bundle)
}

pub fn event(action: &str) -> CommonEventData {
    CommonEventData::new(Want::new(action))
}

pub fn subscription(events: &[&str]) -> SubscribeInfo {
    SubscribeInfo::new(MatchingSkills::for_events(events.iter().copied()))
}

/// Event record as the broker would build it for `publisher`
pub fn record(action: &str, user_id: i32, publisher: EventRecordInfo) -> EventRecord {
    EventRecord {
        data: event(action),
        publish_info: PublishInfo::unordered(),
        record_time: chrono::Utc::now(),
        publisher,
        user_id,
        is_system_event: false,
    }
}
