//! Freeze specs
//!
//! Verify that frozen apps get their events late, in order, and that old
//! events expire while frozen.

use crate::prelude::*;
use similar_asserts::assert_eq;

#[tokio::test]
async fn frozen_app_receives_withheld_events_on_unfreeze() {
    let mut world = World::new();
    let frozen = world.subscribe("frozen", APP, subscription(&["com.example.a", "com.example.b"]));
    let awake = world.subscribe("awake", OTHER_APP, subscription(&["com.example.a"]));

    world.broker.freeze(APP);
    for action in ["com.example.a", "com.example.b"] {
        world
            .publish(OTHER_APP, event(action), PublishInfo::unordered())
            .unwrap();
    }
    world.settle().await;

    assert!(frozen.is_empty());
    assert_eq!(awake.len(), 1);
    assert_eq!(world.broker.frozen_event_count(APP), 2);

    world.broker.unfreeze(APP).unwrap();
    world.settle().await;

    assert_eq!(frozen.actions(), vec!["com.example.a", "com.example.b"]);
    assert_eq!(world.broker.frozen_event_count(APP), 0);
}

#[tokio::test]
async fn subscribing_while_frozen_starts_frozen() {
    let mut world = World::new();
    world.broker.freeze(APP);
    let late = world.subscribe("late", APP, subscription(&["com.example.a"]));

    world
        .publish(OTHER_APP, event("com.example.a"), PublishInfo::unordered())
        .unwrap();
    world.settle().await;
    assert!(late.is_empty());

    world.broker.unfreeze_all().unwrap();
    world.settle().await;
    assert_eq!(late.len(), 1);
}

#[tokio::test]
async fn events_older_than_retention_are_dropped() {
    let mut world = World::new();
    let retention = world.broker.config().freeze_retention;
    let frozen = world.subscribe("frozen", APP, subscription(&["com.example.a", "com.example.b"]));

    world.broker.freeze(APP);
    world
        .publish(OTHER_APP, event("com.example.a"), PublishInfo::unordered())
        .unwrap();
    world.clock.advance(retention + Duration::from_secs(1));
    world
        .publish(OTHER_APP, event("com.example.b"), PublishInfo::unordered())
        .unwrap();
    world.settle().await;
    assert_eq!(world.broker.frozen_event_count(APP), 1);

    world.broker.unfreeze(APP).unwrap();
    world.settle().await;
    assert_eq!(frozen.actions(), vec!["com.example.b"]);
}

#[tokio::test]
async fn ordered_events_skip_frozen_receivers() {
    let mut world = World::new();
    let frozen = world.subscribe("frozen", APP, subscription(&["com.example.a"]).with_priority(1));
    let result = RecordingListener::new();

    world.broker.freeze(APP);
    world
        .publish_ordered(OTHER_APP, event("com.example.a"), &result)
        .unwrap();
    result.wait_for(1).await;
    assert!(frozen.is_empty());

    world.broker.unfreeze(APP).unwrap();
    world.settle().await;
    let replayed = frozen.last().unwrap();
    assert!(!replayed.ordered);
}
