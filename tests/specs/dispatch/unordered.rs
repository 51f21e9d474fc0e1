//! Unordered dispatch specs
//!
//! Verify fan-out, user visibility and publish validation.

use crate::prelude::*;
use similar_asserts::assert_eq;

#[tokio::test]
async fn every_matching_subscriber_of_the_user_receives_the_event() {
    let mut world = World::new();
    let a = world.subscribe("a", APP, subscription(&["com.example.news"]));
    let b = world.subscribe("b", OTHER_APP, subscription(&["com.example.news"]));
    let other_user = world.subscribe("c", NEIGHBOR, subscription(&["com.example.news"]));

    world
        .publish(APP, event("com.example.news"), PublishInfo::unordered())
        .unwrap();
    world.settle().await;

    assert_eq!(a.actions(), vec!["com.example.news"]);
    assert_eq!(b.actions(), vec!["com.example.news"]);
    assert!(other_user.is_empty());
}

#[tokio::test]
async fn system_app_broadcast_reaches_every_user() {
    let mut world = World::new();
    let a = world.subscribe("a", APP, subscription(&["com.example.news"]));
    let other_user = world.subscribe("c", NEIGHBOR, subscription(&["com.example.news"]));

    world
        .publish(SYSTEM_APP, event("com.example.news"), PublishInfo::unordered())
        .unwrap();
    world.settle().await;

    assert_eq!(a.len(), 1);
    assert_eq!(other_user.len(), 1);
}

#[tokio::test]
async fn required_permission_filters_receivers() {
    let mut world = World::new();
    let granted = world.subscribe("granted", APP, subscription(&["com.example.secret"]));
    let denied = world.subscribe("denied", OTHER_APP, subscription(&["com.example.secret"]));
    world.deps.identity.grant(APP as TokenId, "com.example.permission.SECRET");

    world
        .publish(
            APP,
            event("com.example.secret"),
            PublishInfo::unordered().require_permission("com.example.permission.SECRET"),
        )
        .unwrap();
    world.settle().await;

    assert_eq!(granted.len(), 1);
    assert!(denied.is_empty());
}

#[tokio::test]
async fn ordinary_apps_cannot_publish_system_events() {
    let world = World::new();
    let result = world.publish(
        APP,
        event("usual.event.BOOT_COMPLETED"),
        PublishInfo::unordered(),
    );
    assert!(matches!(result, Err(BrokerError::Unauthorized(_))));
    assert_eq!(world.deps.telemetry.count("PUBLISH_ERROR"), 1);

    world
        .publish(NATIVE, event("usual.event.BOOT_COMPLETED"), PublishInfo::unordered())
        .unwrap();
}

#[tokio::test]
async fn storage_events_reach_legacy_subscribers() {
    let mut world = World::new();
    let legacy = world.subscribe("legacy", APP, subscription(&["usual.event.DISK_MOUNTED"]));

    world
        .publish(
            NATIVE,
            event("usual.event.data.DISK_MOUNTED"),
            PublishInfo::unordered(),
        )
        .unwrap();
    world.settle().await;

    assert_eq!(legacy.actions(), vec!["usual.event.DISK_MOUNTED"]);
}
