//! Shared fixtures for broker specs

#![allow(dead_code)]

pub use ces_adapters::RecordingListener;
pub use ces_core::{
    BrokerConfig, CommonEventData, FakeClock, ListenerHandle, ListenerId, PublishInfo,
    SubscribeInfo, TokenId, Uid, ALL_USER, UNDEFINED_USER,
};
pub use ces_engine::test_support::{app, event, fake_deps, subscription, FakeDeps};
pub use ces_engine::{BrokerError, DumpKind, EventBroker, STICKY_PERMISSION};
pub use std::sync::Arc;
pub use std::time::Duration;

/// Ordinary app, user 100
pub const APP: Uid = 20_010_001;
/// Second ordinary app, user 100
pub const OTHER_APP: Uid = 20_010_002;
/// Ordinary app, user 101
pub const NEIGHBOR: Uid = 20_210_001;
/// System app, user 100
pub const SYSTEM_APP: Uid = 20_010_100;
/// Native subsystem
pub const NATIVE: Uid = 1_000;

/// A running broker with fake collaborators
pub struct World {
    pub deps: FakeDeps,
    pub clock: FakeClock,
    pub broker: EventBroker<FakeDeps, FakeClock>,
    handles: Vec<ListenerHandle>,
}

impl World {
    pub fn new() -> Self {
        Self::with_config(BrokerConfig::for_testing())
    }

    pub fn with_config(config: BrokerConfig) -> Self {
        let deps = fake_deps();
        deps.identity.set_system_app(SYSTEM_APP);
        deps.identity.set_native(NATIVE as TokenId);
        let clock = FakeClock::new();
        let broker = EventBroker::start(deps.clone(), clock.clone(), config).unwrap();
        Self {
            deps,
            clock,
            broker,
            handles: Vec::new(),
        }
    }

    /// Subscribe a recording listener on behalf of `uid`
    pub fn subscribe(&mut self, id: &str, uid: Uid, info: SubscribeInfo) -> Arc<RecordingListener> {
        let listener = RecordingListener::new();
        let handle = listener.handle(id);
        self.broker
            .subscribe(info, &handle, &app(uid, &format!("com.example.{id}")))
            .unwrap();
        self.handles.push(handle);
        listener
    }

    pub fn publish(
        &self,
        uid: Uid,
        data: CommonEventData,
        info: PublishInfo,
    ) -> Result<(), BrokerError> {
        self.broker.publish(
            data,
            info,
            None,
            &app(uid, "com.example.publisher"),
            UNDEFINED_USER,
        )
    }

    pub fn publish_ordered(
        &self,
        uid: Uid,
        data: CommonEventData,
        result_to: &Arc<RecordingListener>,
    ) -> Result<(), BrokerError> {
        self.broker.publish(
            data,
            PublishInfo::ordered(),
            Some(result_to.handle("result")),
            &app(uid, "com.example.publisher"),
            UNDEFINED_USER,
        )
    }

    pub fn finish(&self, id: &str, code: i32, data: &str) {
        self.broker
            .finish_receiver(&ListenerId::new(id), code, data, false)
            .unwrap();
    }

    /// Let both dispatch loops drain
    pub async fn settle(&self) {
        for _ in 0..10 {
            self.broker.flush().await;
            tokio::task::yield_now().await;
        }
    }
}
