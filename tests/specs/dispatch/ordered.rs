//! Ordered dispatch specs
//!
//! Verify priority order, result propagation, abort and receiver timeouts.

use crate::prelude::*;
use similar_asserts::assert_eq;

#[tokio::test(start_paused = true)]
async fn receivers_run_by_priority_and_pass_results_along() {
    let mut world = World::new();
    let chain = subscription(&["com.example.chain"]);
    let low = world.subscribe("low", APP, chain.clone().with_priority(-5));
    let high = world.subscribe("high", OTHER_APP, chain.with_priority(100));
    let result = RecordingListener::new();

    world
        .publish_ordered(APP, event("com.example.chain").with_result(0, "start"), &result)
        .unwrap();

    high.wait_for(1).await;
    assert!(low.is_empty());
    assert_eq!(high.last().unwrap().data.data, "start");
    world.finish("high", 1, "high-saw-it");

    low.wait_for(1).await;
    assert_eq!(low.last().unwrap().data.code, 1);
    assert_eq!(low.last().unwrap().data.data, "high-saw-it");
    world.finish("low", 2, "low-saw-it");

    result.wait_for(1).await;
    let last = result.last().unwrap();
    assert_eq!(last.data.code, 2);
    assert_eq!(last.data.data, "low-saw-it");
    assert!(last.ordered);
}

#[tokio::test(start_paused = true)]
async fn abort_stops_the_chain() {
    let mut world = World::new();
    let chain = subscription(&["com.example.chain"]);
    let first = world.subscribe("first", APP, chain.clone().with_priority(1));
    let second = world.subscribe("second", OTHER_APP, chain);
    let result = RecordingListener::new();

    world
        .publish_ordered(APP, event("com.example.chain"), &result)
        .unwrap();
    first.wait_for(1).await;
    world
        .broker
        .finish_receiver(&ListenerId::new("first"), 7, "stop", true)
        .unwrap();

    result.wait_for(1).await;
    world.settle().await;
    assert!(second.is_empty());
    assert_eq!(result.last().unwrap().data.code, 7);
}

#[tokio::test(start_paused = true)]
async fn silent_receiver_times_out_and_the_next_one_runs() {
    let mut world = World::new();
    let timeout = world.broker.config().receiver_timeout;
    let chain = subscription(&["com.example.chain"]);
    let silent = world.subscribe("silent", APP, chain.clone().with_priority(1));
    let next = world.subscribe("next", OTHER_APP, chain);
    let result = RecordingListener::new();

    world
        .publish_ordered(APP, event("com.example.chain"), &result)
        .unwrap();
    silent.wait_for(1).await;
    tokio::time::sleep(timeout + Duration::from_millis(1)).await;

    next.wait_for(1).await;
    world.finish("next", 3, "done");
    result.wait_for(1).await;
    world.settle().await;

    assert_eq!(world.deps.telemetry.count("ORDERED_EVENT_PROC_TIMEOUT"), 1);
    let history = world.broker.dump("com.example.chain", ALL_USER, DumpKind::History);
    assert!(history[0].contains("\t\tEventState: TIMEOUT\n"));
    assert!(history[0].contains("\t\tEventState: DELIVERED\n"));
}

#[tokio::test(start_paused = true)]
async fn ordered_events_wait_for_each_other() {
    let mut world = World::new();
    let only = world.subscribe("only", APP, subscription(&["com.example.a", "com.example.b"]));
    let result = RecordingListener::new();

    world.publish_ordered(APP, event("com.example.a"), &result).unwrap();
    world.publish_ordered(APP, event("com.example.b"), &result).unwrap();

    only.wait_for(1).await;
    world.settle().await;
    assert_eq!(only.actions(), vec!["com.example.a"]);

    world.finish("only", 0, "");
    only.wait_for(2).await;
    world.finish("only", 0, "");
    result.wait_for(2).await;
    assert_eq!(result.actions(), vec!["com.example.a", "com.example.b"]);
}
