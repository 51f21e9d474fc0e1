//! Sticky event specs
//!
//! Verify the last sticky publish wins and is replayed to late subscribers.

use crate::prelude::*;
use similar_asserts::assert_eq;

fn sticky() -> PublishInfo {
    PublishInfo::unordered().sticky()
}

#[tokio::test]
async fn last_sticky_publish_wins() {
    let mut world = World::new();
    world
        .publish(NATIVE, event("com.example.state").with_result(1, "old"), sticky())
        .unwrap();
    world
        .publish(NATIVE, event("com.example.state").with_result(2, "new"), sticky())
        .unwrap();

    let cached = world.broker.get_sticky("com.example.state").unwrap();
    assert_eq!(cached.code, 2);
    assert_eq!(cached.data, "new");

    let late = world.subscribe("late", APP, subscription(&["com.example.state"]));
    world.settle().await;
    assert_eq!(late.len(), 1);
    let delivery = late.last().unwrap();
    assert!(delivery.sticky);
    assert_eq!(delivery.data.data, "new");
}

#[tokio::test]
async fn sticky_needs_permission() {
    let world = World::new();
    let denied = world.publish(SYSTEM_APP, event("com.example.state"), sticky());
    assert!(matches!(denied, Err(BrokerError::Unauthorized(_))));
    assert!(world.broker.get_sticky("com.example.state").is_none());

    world
        .deps
        .identity
        .grant(SYSTEM_APP as TokenId, STICKY_PERMISSION);
    world
        .publish(SYSTEM_APP, event("com.example.state"), sticky())
        .unwrap();
    assert!(world.broker.get_sticky("com.example.state").is_some());
}

#[tokio::test]
async fn sticky_events_show_in_dump() {
    let world = World::new();
    world
        .publish(NATIVE, event("com.example.state"), sticky())
        .unwrap();

    let sections = world
        .broker
        .dump("com.example.state", ALL_USER, DumpKind::Sticky);
    assert_eq!(sections.len(), 1);
    assert!(sections[0].starts_with("Sticky Events:\tTotal 1 information\nNO 1\n"));
    assert!(sections[0].contains("\t\tAction: com.example.state\n"));
}
