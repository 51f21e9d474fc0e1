// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Human-readable diagnostics
//!
//! Plain text, one `Key: value` per line. Nested sections are indented
//! with tabs.

use crate::delivery::{DeliverySnapshot, ReceiverSnapshot};
use ces_core::{user_label, EventRecord};
use chrono::{DateTime, Utc};
use std::fmt::Write;

/// Which section(s) of state to render
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DumpKind {
    #[default]
    All,
    Subscribers,
    Sticky,
    Pending,
    History,
}

/// Help text for [`crate::EventBroker::hidump`]
pub const HIDUMP_HELP: &str = "Usage:dump <command> [options]\n\
Description:\n\
\x20 -h, --help                   list available commands\n\
\x20 -a, --all                    dump the info of all events\n\
\x20 -e, --event <name>           dump the info of a specified event\n";

fn time(at: DateTime<Utc>) -> String {
    at.format("%Y%m%d %I:%M %p").to_string()
}

fn millis(at: Option<DateTime<Utc>>) -> i64 {
    at.map_or(0, |t| t.timestamp_millis())
}

fn header(title: &str, unit: &str, count: usize) -> String {
    if count == 0 {
        format!("{title}:\tNo information")
    } else {
        format!("{title}:\tTotal {count} {unit}\n")
    }
}

/// Full subscriber description, every line prefixed with `p`
fn receiver_detail(out: &mut String, r: &ReceiverSnapshot, p: &str) {
    let skills = &r.info.matching_skills;
    let _ = writeln!(out, "{p}Time: {}", time(r.record_time));
    let _ = writeln!(out, "{p}PID: {}", r.pid);
    let _ = writeln!(out, "{p}UID: {}", r.uid);
    let _ = writeln!(out, "{p}BundleName: {}", r.bundle_name);
    let _ = writeln!(out, "{p}Priority: {}", r.info.priority);
    let _ = writeln!(out, "{p}USERID: {}", user_label(r.info.user_id));
    let _ = writeln!(out, "{p}Permission: {}", r.info.permission);
    let _ = writeln!(out, "{p}DevicedID: {}", r.info.device_id);
    let _ = writeln!(out, "{p}MatchingSkills:");
    let _ = writeln!(out, "{p}\tEvent: {}", skills.events().join(", "));
    let _ = writeln!(out, "{p}\tEntity: {}", skills.entities().join(", "));
    let _ = writeln!(out, "{p}\tScheme: {}", skills.schemes().join(", "));
    freeze_lines(out, r, p);
}

/// Short subscriber description used in history
fn receiver_brief(out: &mut String, r: &ReceiverSnapshot, p: &str) {
    let _ = writeln!(out, "{p}Time: {}", time(r.record_time));
    let _ = writeln!(out, "{p}BundleName: {}", r.bundle_name);
    let _ = writeln!(out, "{p}Priority: {}", r.info.priority);
    let _ = writeln!(out, "{p}USERID: {}", user_label(r.info.user_id));
    let _ = writeln!(out, "{p}Permission: {}", r.info.permission);
    let _ = writeln!(out, "{p}DevicedID: {}", r.info.device_id);
    freeze_lines(out, r, p);
}

fn freeze_lines(out: &mut String, r: &ReceiverSnapshot, p: &str) {
    let _ = writeln!(out, "{p}IsFreeze: {}", r.is_frozen);
    match r.freeze_time {
        Some(at) => {
            let _ = writeln!(out, "{p}FreezeTime: {}", at.timestamp_millis());
        }
        None => {
            let _ = writeln!(out, "{p}FreezeTime:  -");
        }
    }
}

fn record_lines(out: &mut String, record: &EventRecord) {
    let want = &record.data.want;
    let publisher = &record.publisher;
    let _ = writeln!(out, "\tTime: {}", time(record.record_time));
    let _ = writeln!(out, "\tPID: {}", publisher.pid);
    let _ = writeln!(out, "\tUID: {}", publisher.uid);
    let _ = writeln!(out, "\tUSERID: {}", user_label(record.user_id));
    let _ = writeln!(out, "\tBundleName: {}", publisher.bundle_name);
    let _ = writeln!(
        out,
        "\tRequiredPermission: {}",
        record.publish_info.subscriber_permissions.join(", ")
    );
    let _ = writeln!(out, "\tIsSticky: {}", record.is_sticky());
    let _ = writeln!(out, "\tIsOrdered: {}", record.is_ordered());
    let _ = writeln!(out, "\tIsSystemApp: {}", publisher.is_system_app);
    let _ = writeln!(out, "\tIsSystemEvent: {}", record.is_system_event);
    let _ = writeln!(out, "\tWant:");
    let _ = writeln!(out, "\t\tAction: {}", want.action);
    let _ = writeln!(out, "\t\tEntity: {}", want.entities.join(", "));
    let _ = writeln!(out, "\t\tScheme: {}", want.scheme);
    let _ = writeln!(out, "\t\tUri: {}", want.uri);
    let _ = writeln!(out, "\t\tFlags: {}", want.flags);
    let _ = writeln!(out, "\t\tType: {}", want.mime_type);
    let _ = writeln!(out, "\t\tBundleName: {}", want.bundle);
    let _ = writeln!(out, "\t\tAbilityName: {}", want.ability);
    let _ = writeln!(out, "\t\tDevicedID: {}", want.device_id);
}

fn delivery_lines(out: &mut String, snapshot: &DeliverySnapshot, detailed: bool) {
    record_lines(out, &snapshot.record);
    let _ = writeln!(out, "\tCode: {}", snapshot.record.data.code);
    let _ = writeln!(out, "\tData: {}", snapshot.record.data.data);
    let _ = writeln!(out, "\tHasLastSubscriber: {}", snapshot.has_last_subscriber);
    let _ = writeln!(out, "\tEventState: {}", snapshot.dispatch_state);
    let _ = writeln!(out, "\tReceiverTime: {}", millis(snapshot.receiver_time));
    let _ = writeln!(out, "\tDispatchTime: {}", millis(snapshot.dispatch_time));
    let _ = writeln!(out, "\tResultAbort: {}", snapshot.aborted);

    if snapshot.receivers.is_empty() {
        let _ = writeln!(out, "\tSubscribers:\tNo information");
        return;
    }
    let _ = writeln!(
        out,
        "\tSubscribers:\tTotal {} subscribers",
        snapshot.receivers.len()
    );
    for (index, (receiver, state)) in snapshot.outcomes().enumerate() {
        let _ = writeln!(out, "\tNO {}", index + 1);
        if detailed {
            receiver_detail(out, receiver, "\t\t");
        } else {
            receiver_brief(out, receiver, "\t\t");
        }
        let _ = writeln!(out, "\t\tEventState: {state}");
    }
}

/// Subscriber section
pub fn subscribers(receivers: &[ReceiverSnapshot]) -> String {
    let mut out = header("Subscribers", "subscribers", receivers.len());
    for (index, receiver) in receivers.iter().enumerate() {
        let _ = writeln!(out, "NO {}", index + 1);
        receiver_detail(&mut out, receiver, "\t");
    }
    out
}

/// Sticky cache section
pub fn sticky(records: &[EventRecord]) -> String {
    let mut out = header("Sticky Events", "information", records.len());
    for (index, record) in records.iter().enumerate() {
        let _ = writeln!(out, "NO {}", index + 1);
        record_lines(&mut out, record);
        let _ = writeln!(out, "\tCode: {}", record.data.code);
        let _ = writeln!(out, "\tData: {}", record.data.data);
    }
    out
}

/// Pending section: records still queued for dispatch
pub fn pending(snapshots: &[DeliverySnapshot]) -> String {
    let mut out = header("Pending Events", "information", snapshots.len());
    for (index, snapshot) in snapshots.iter().enumerate() {
        let _ = writeln!(out, "NO {}", index + 1);
        delivery_lines(&mut out, snapshot, true);
    }
    out
}

/// History section: completed deliveries, oldest first
pub fn history(snapshots: &[DeliverySnapshot]) -> String {
    let mut out = header("History Events", "information", snapshots.len());
    for (index, snapshot) in snapshots.iter().enumerate() {
        let _ = writeln!(out, "NO {}", index + 1);
        delivery_lines(&mut out, snapshot, false);
    }
    out
}

#[cfg(test)]
#[path = "dump_tests.rs"]
mod tests;
