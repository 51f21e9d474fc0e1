// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::permission::{EventPermission, PermissionTable};
use crate::test_support::{app, fake_deps, record, subscription, FakeDeps};
use ces_adapters::RecordingListener;
use ces_core::{
    BrokerConfig, CommonEventData, CommonEventListener, EventRecordInfo, FakeClock, PublishInfo,
    Uid,
};

const TIMEOUT: Duration = Duration::from_millis(100);

struct Harness {
    deps: FakeDeps,
    ctx: Arc<DispatchContext<FakeDeps, FakeClock>>,
    engine: OrderedDispatchEngine<FakeDeps>,
    handles: Vec<ListenerHandle>,
    _deaths: mpsc::UnboundedReceiver<ListenerId>,
}

impl Harness {
    fn new() -> Self {
        Self::with_permissions(PermissionTable::empty())
    }

    fn with_permissions(permissions: PermissionTable) -> Self {
        Self::build(permissions, TIMEOUT)
    }

    fn with_timeout(timeout: Duration) -> Self {
        Self::build(PermissionTable::empty(), timeout)
    }

    fn build(permissions: PermissionTable, timeout: Duration) -> Self {
        let deps = fake_deps();
        let (tx, rx) = mpsc::unbounded_channel();
        let config = BrokerConfig::for_testing().with_receiver_timeout(timeout);
        let ctx = Arc::new(DispatchContext::new(
            deps.clone(),
            FakeClock::new(),
            &config,
            permissions,
            tx,
        ));
        let engine = OrderedDispatchEngine::start(ctx.clone(), timeout, &Handle::current());
        Self {
            deps,
            ctx,
            engine,
            handles: Vec::new(),
            _deaths: rx,
        }
    }

    fn subscribe(&mut self, id: &str, priority: i32, uid: Uid) -> Arc<RecordingListener> {
        let listener = RecordingListener::new();
        self.subscribe_handle(listener.handle(id), priority, uid);
        listener
    }

    fn subscribe_handle(&mut self, handle: ListenerHandle, priority: i32, uid: Uid) {
        let caller = EventRecordInfo::from_caller(&app(uid, "com.example.app"), false, false);
        self.ctx
            .registry
            .insert(
                subscription(&["e"]).with_priority(priority).with_user(100),
                &handle,
                caller,
                chrono::Utc::now(),
            )
            .unwrap();
        self.handles.push(handle);
    }

    fn publish(&self, result_to: Option<ListenerHandle>) -> usize {
        let publisher = EventRecordInfo::from_caller(&app(1, "com.example.pub"), false, false);
        let mut event = record("e", 100, publisher);
        event.publish_info = PublishInfo::ordered();
        self.engine.enqueue(event, result_to).unwrap()
    }

    fn finish(&self, id: &str, code: i32, data: &str, abort: bool) {
        self.engine
            .finish_receiver(&ListenerId::new(id), code, data.to_string(), abort)
            .unwrap();
    }

    fn history(&self) -> Vec<DeliverySnapshot> {
        self.ctx
            .history
            .lock()
            .unwrap()
            .filtered("", ALL_USER)
    }
}

#[tokio::test(start_paused = true)]
async fn receivers_run_in_priority_order_and_results_carry_over() {
    let mut h = Harness::new();
    let low = h.subscribe("low", 1, 3);
    let high = h.subscribe("high", 10, 1);
    let mid = h.subscribe("mid", 5, 2);
    let result = RecordingListener::new();

    assert_eq!(h.publish(Some(result.handle("result"))), 3);

    high.wait_for(1).await;
    assert!(mid.is_empty());
    assert!(high.deliveries()[0].ordered);
    h.finish("high", 1, "from-high", false);

    mid.wait_for(1).await;
    assert_eq!(mid.deliveries()[0].data.code, 1);
    assert_eq!(mid.deliveries()[0].data.data, "from-high");
    assert!(low.is_empty());
    h.finish("mid", 2, "from-mid", false);

    low.wait_for(1).await;
    assert_eq!(low.deliveries()[0].data.data, "from-mid");
    h.finish("low", 3, "from-low", false);

    result.wait_for(1).await;
    let last = result.last().unwrap();
    assert!(last.ordered);
    assert_eq!(last.data.code, 3);
    assert_eq!(last.data.data, "from-low");

    h.engine.flush().await;
    let history = h.history();
    assert_eq!(history.len(), 1);
    assert!(history[0].has_last_subscriber);
    assert_eq!(
        history[0].states,
        vec![DeliveryState::Delivered; 3]
    );
    assert!(h.engine.is_empty());
}

#[tokio::test(start_paused = true)]
async fn abort_skips_remaining_receivers() {
    let mut h = Harness::new();
    let first = h.subscribe("first", 2, 1);
    let second = h.subscribe("second", 1, 2);
    let result = RecordingListener::new();
    h.publish(Some(result.handle("result")));

    first.wait_for(1).await;
    h.finish("first", 9, "stop", true);
    result.wait_for(1).await;
    h.engine.flush().await;

    assert!(second.is_empty());
    assert_eq!(result.last().unwrap().data.code, 9);
    let history = h.history();
    assert!(history[0].aborted);
    assert_eq!(
        history[0].states,
        vec![DeliveryState::Delivered, DeliveryState::Pending]
    );
}

#[tokio::test(start_paused = true)]
async fn silent_receiver_times_out_and_chain_continues() {
    let mut h = Harness::new();
    let first = h.subscribe("first", 3, 1);
    let silent = h.subscribe("silent", 2, 2);
    let last = h.subscribe("last", 1, 3);
    let result = RecordingListener::new();
    h.publish(Some(result.handle("result")));

    first.wait_for(1).await;
    h.finish("first", 1, "one", false);
    silent.wait_for(1).await;

    tokio::time::sleep(TIMEOUT + Duration::from_millis(1)).await;
    last.wait_for(1).await;
    assert_eq!(last.deliveries()[0].data.data, "one");
    h.finish("last", 3, "three", false);
    result.wait_for(1).await;
    h.engine.flush().await;

    assert_eq!(result.last().unwrap().data.code, 3);
    assert_eq!(
        h.history()[0].states,
        vec![
            DeliveryState::Delivered,
            DeliveryState::TimedOut,
            DeliveryState::Delivered
        ]
    );
    assert_eq!(h.deps.telemetry.count("ORDERED_EVENT_PROC_TIMEOUT"), 1);
}

#[tokio::test(start_paused = true)]
async fn late_finish_after_timeout_is_ignored() {
    let mut h = Harness::new();
    let silent = h.subscribe("silent", 2, 1);
    let next = h.subscribe("next", 1, 2);
    h.publish(None);

    silent.wait_for(1).await;
    tokio::time::sleep(TIMEOUT + Duration::from_millis(1)).await;
    next.wait_for(1).await;

    h.finish("silent", 7, "late", false);
    h.engine.flush().await;
    assert!(h.history().is_empty());
    assert_eq!(h.engine.pending("", ALL_USER)[0].record.data.code, 0);
}

#[tokio::test(start_paused = true)]
async fn finish_from_other_listener_is_ignored() {
    let mut h = Harness::new();
    let first = h.subscribe("first", 2, 1);
    let second = h.subscribe("second", 1, 2);
    h.publish(None);

    first.wait_for(1).await;
    h.finish("second", 5, "wrong", false);
    h.engine.flush().await;

    assert!(second.is_empty());
    let pending = h.engine.pending("", ALL_USER);
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].dispatch_state, DispatchState::AwaitingReceiverAck);
    assert_eq!(pending[0].record.data.code, 0);
}

#[tokio::test(start_paused = true)]
async fn departed_receiver_finishes_with_current_result() {
    let mut h = Harness::new();
    let first = h.subscribe("first", 2, 1);
    let second = h.subscribe("second", 1, 2);
    h.publish(None);

    first.wait_for(1).await;
    h.ctx.registry.remove(&ListenerId::new("first")).unwrap();
    h.engine.receiver_gone(&ListenerId::new("first")).unwrap();

    second.wait_for(1).await;
    assert_eq!(second.deliveries()[0].data.code, 0);
}

#[tokio::test(start_paused = true)]
async fn no_receivers_reports_straight_to_result_listener() {
    let h = Harness::new();
    let result = RecordingListener::new();
    assert_eq!(h.publish(Some(result.handle("result"))), 0);

    result.wait_for(1).await;
    h.engine.flush().await;
    let history = h.history();
    assert_eq!(history.len(), 1);
    assert!(history[0].receivers.is_empty());
}

#[tokio::test(start_paused = true)]
async fn events_are_serialized() {
    let mut h = Harness::new();
    let only = h.subscribe("only", 1, 1);
    h.publish(None);
    h.publish(None);

    only.wait_for(1).await;
    h.engine.flush().await;
    assert_eq!(only.len(), 1);
    assert_eq!(h.engine.len(), 2);

    h.finish("only", 0, "", false);
    only.wait_for(2).await;
    h.finish("only", 0, "", false);
    h.engine.flush().await;
    assert!(h.engine.is_empty());
    assert_eq!(h.history().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn denied_and_frozen_receivers_are_skipped() {
    let mut h = Harness::with_permissions(
        PermissionTable::empty().with_entry("e", EventPermission::single("p.e")),
    );
    let denied = h.subscribe("denied", 3, 1);
    let frozen = h.subscribe("frozen", 2, 2);
    let open = h.subscribe("open", 1, 3);
    h.deps.identity.grant(2, "p.e");
    h.deps.identity.grant(3, "p.e");
    h.ctx.registry.set_freeze(2, true, chrono::Utc::now());

    h.publish(None);
    open.wait_for(1).await;
    h.finish("open", 0, "", false);
    h.engine.flush().await;

    assert!(denied.is_empty());
    assert!(frozen.is_empty());
    assert_eq!(h.ctx.registry.frozen_count(2), 1);
    assert_eq!(
        h.history()[0].states,
        vec![
            DeliveryState::Skipped,
            DeliveryState::Skipped,
            DeliveryState::Delivered
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn dropped_listener_is_skipped() {
    let mut h = Harness::new();
    let gone = h.subscribe("gone", 2, 1);
    let alive = h.subscribe("alive", 1, 2);
    h.handles.remove(0);
    drop(gone);

    h.publish(None);
    alive.wait_for(1).await;
    let pending = h.engine.pending("", ALL_USER);
    assert_eq!(
        pending[0].states,
        vec![DeliveryState::Skipped, DeliveryState::Delivered]
    );
}

/// Blocks the dispatch thread inside `notify_event` before recording
struct StallingListener {
    stall: Duration,
    inner: Arc<RecordingListener>,
}

impl CommonEventListener for StallingListener {
    fn notify_event(&self, data: &CommonEventData, ordered: bool, sticky: bool) {
        std::thread::sleep(self.stall);
        self.inner.notify_event(data, ordered, sticky);
    }
}

#[tokio::test]
async fn record_in_flight_past_total_budget_is_finalized() {
    let timeout = Duration::from_millis(20);
    let mut h = Harness::with_timeout(timeout);
    let stalled = RecordingListener::new();
    let stalling = Arc::new(StallingListener {
        stall: timeout * 5,
        inner: stalled.clone(),
    });
    let handle = ListenerHandle::with_id(ListenerId::new("stall"), stalling);
    h.subscribe_handle(handle, 10, 1);
    let second = h.subscribe("second", 1, 2);
    let result = RecordingListener::new();

    // Budget is 2 x 20ms x 2 receivers; the first receiver alone takes 100ms
    assert_eq!(h.publish(Some(result.handle("result"))), 2);
    result.wait_for(1).await;
    h.engine.flush().await;

    assert_eq!(stalled.len(), 1);
    assert!(second.is_empty());
    assert_eq!(result.len(), 1);
    assert!(h.engine.is_empty());
    let history = h.history();
    assert_eq!(history.len(), 1);
    assert_eq!(
        history[0].states,
        vec![DeliveryState::TimedOut, DeliveryState::Pending]
    );
    assert_eq!(h.deps.telemetry.count("ORDERED_EVENT_PROC_TIMEOUT"), 1);
}
