// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{TelemetryEvent, TelemetrySink};

/// Writes telemetry records as `tracing` events on the `ces::telemetry` target
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingTelemetry;

impl TracingTelemetry {
    pub fn new() -> Self {
        Self
    }
}

impl TelemetrySink for TracingTelemetry {
    fn emit(&self, event: TelemetryEvent) {
        let kind = event.kind();
        match &event {
            TelemetryEvent::OrderedTimeout { event, receiver } => tracing::warn!(
                target: "ces::telemetry",
                kind,
                event = %event,
                bundle = %receiver.bundle_name,
                pid = receiver.pid,
                uid = receiver.uid,
            ),
            TelemetryEvent::SubscriberLimitExceeded {
                event,
                count,
                threshold,
                origin,
            } => tracing::warn!(
                target: "ces::telemetry",
                kind,
                event = %event,
                count,
                threshold,
                bundle = %origin.bundle_name,
                pid = origin.pid,
                uid = origin.uid,
            ),
            TelemetryEvent::PublishError {
                event,
                reason,
                origin,
            } => tracing::warn!(
                target: "ces::telemetry",
                kind,
                event = %event,
                reason = %reason,
                bundle = %origin.bundle_name,
                pid = origin.pid,
                uid = origin.uid,
            ),
            TelemetryEvent::Publish {
                event,
                user_id,
                origin,
            } => tracing::info!(
                target: "ces::telemetry",
                kind,
                event = %event,
                user_id,
                bundle = %origin.bundle_name,
                pid = origin.pid,
                uid = origin.uid,
            ),
            TelemetryEvent::Subscribe {
                events,
                user_id,
                origin,
            }
            | TelemetryEvent::Unsubscribe {
                events,
                user_id,
                origin,
            } => tracing::info!(
                target: "ces::telemetry",
                kind,
                events = %events.join(","),
                user_id,
                bundle = %origin.bundle_name,
                pid = origin.pid,
                uid = origin.uid,
            ),
        }
    }
}
