//! Subscriber capacity specs
//!
//! Verify the per-event subscriber warning threshold.

use crate::prelude::*;
use similar_asserts::assert_eq;

#[tokio::test]
async fn exceeding_the_warning_threshold_is_reported_but_allowed() {
    let mut world = World::with_config(BrokerConfig::default());
    let threshold = world.broker.config().subscriber_warn_threshold;
    assert_eq!(threshold, 255);

    let mut listeners = Vec::new();
    for n in 0..threshold {
        listeners.push(world.subscribe(&format!("s{n}"), APP, subscription(&["com.example.busy"])));
    }
    assert_eq!(world.deps.telemetry.count("SUBSCRIBER_EXCEED_MAXIMUM"), 0);

    let last = world.subscribe("overflow", APP, subscription(&["com.example.busy"]));
    assert_eq!(world.deps.telemetry.count("SUBSCRIBER_EXCEED_MAXIMUM"), 1);
    assert_eq!(world.broker.subscriber_count(), threshold + 1);

    world
        .publish(APP, event("com.example.busy"), PublishInfo::unordered())
        .unwrap();
    world.settle().await;
    assert_eq!(last.len(), 1);
    assert!(listeners.iter().all(|l| l.len() == 1));
}

#[tokio::test]
async fn too_many_events_in_one_subscription_is_rejected() {
    let world = World::new();
    let max = world.broker.config().max_events_per_subscription;
    let names: Vec<String> = (0..=max).map(|n| format!("com.example.e{n}")).collect();
    let names: Vec<&str> = names.iter().map(String::as_str).collect();

    let handle = RecordingListener::new().handle("greedy");
    let result = world
        .broker
        .subscribe(subscription(&names), &handle, &app(APP, "com.example.greedy"));
    assert!(matches!(result, Err(BrokerError::Registry(_))));
}
