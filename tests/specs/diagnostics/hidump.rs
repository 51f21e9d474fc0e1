//! Diagnostics specs
//!
//! Verify hidump argument handling and output layout.

use crate::prelude::*;
use similar_asserts::assert_eq;

#[tokio::test]
async fn help_lists_options() {
    let world = World::new();
    let help = world.broker.hidump(&["-h"]);
    assert!(help.starts_with("Usage:dump <command> [options]\n"));
    assert!(help.contains("-e, --event <name>"));
}

#[tokio::test]
async fn bad_arguments_are_reported() {
    let world = World::new();
    assert_eq!(world.broker.hidump(&[]), "error: unknown option.");
    assert_eq!(world.broker.hidump(&["--bogus"]), "error: unknown option.");
    assert_eq!(world.broker.hidump(&["-e"]), "error: request a event value.");
    assert_eq!(world.broker.hidump(&["--event"]), "error: request a event value.");
}

#[tokio::test]
async fn empty_broker_has_no_information() {
    let world = World::new();
    assert_eq!(
        world.broker.hidump(&["-a"]),
        "Subscribers:\tNo information\n\
         Sticky Events:\tNo information\n\
         Pending Events:\tNo information\n\
         History Events:\tNo information\n"
    );
}

#[tokio::test]
async fn event_dump_is_scoped_to_that_event() {
    let mut world = World::new();
    world.subscribe("a", APP, subscription(&["com.example.a"]));
    world.subscribe("b", APP, subscription(&["com.example.b"]));
    world
        .publish(APP, event("com.example.a"), PublishInfo::unordered())
        .unwrap();
    world.settle().await;

    let out = world.broker.hidump(&["-e", "com.example.a"]);
    assert!(out.starts_with("Subscribers:\tTotal 1 subscribers\nNO 1\n"));
    assert!(out.contains("\tBundleName: com.example.a\n"));
    assert!(!out.contains("com.example.b"));
    assert!(out.contains("History Events:\tTotal 1 information\n"));

    let all = world.broker.hidump(&["--all"]);
    assert!(all.starts_with("Subscribers:\tTotal 2 subscribers\n"));
}

#[tokio::test(start_paused = true)]
async fn in_flight_ordered_event_shows_as_pending() {
    let mut world = World::new();
    let slow = world.subscribe("slow", APP, subscription(&["com.example.a"]));
    let result = RecordingListener::new();
    world
        .publish_ordered(APP, event("com.example.a"), &result)
        .unwrap();
    slow.wait_for(1).await;

    let out = world.broker.hidump(&["-e", "com.example.a"]);
    assert!(out.contains("Pending Events:\tTotal 1 information\n"));
    assert!(out.contains("\tIsOrdered: true\n"));
    assert!(out.contains("\tEventState: AWAITING_RECEIVER_ACK\n"));
    assert!(out.contains("\t\tEventState: DELIVERED\n"));
}
