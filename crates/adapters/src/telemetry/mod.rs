// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured telemetry: fire-and-forget fault and usage records

mod tracing_sink;

pub use tracing_sink::TracingTelemetry;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeTelemetry;

use ces_core::{EventRecordInfo, Uid};

/// Who triggered a telemetry record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TelemetryOrigin {
    pub pid: i32,
    pub uid: Uid,
    pub bundle_name: String,
}

impl From<&EventRecordInfo> for TelemetryOrigin {
    fn from(info: &EventRecordInfo) -> Self {
        Self {
            pid: info.pid,
            uid: info.uid,
            bundle_name: info.bundle_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelemetryEvent {
    /// An ordered receiver never finished within its window
    OrderedTimeout {
        event: String,
        receiver: TelemetryOrigin,
    },
    /// More subscribers on one event than the warning threshold
    SubscriberLimitExceeded {
        event: String,
        count: usize,
        threshold: usize,
        origin: TelemetryOrigin,
    },
    PublishError {
        event: String,
        reason: String,
        origin: TelemetryOrigin,
    },
    Publish {
        event: String,
        user_id: i32,
        origin: TelemetryOrigin,
    },
    Subscribe {
        events: Vec<String>,
        user_id: i32,
        origin: TelemetryOrigin,
    },
    Unsubscribe {
        events: Vec<String>,
        user_id: i32,
        origin: TelemetryOrigin,
    },
}

impl TelemetryEvent {
    /// Stable name for the record type
    pub fn kind(&self) -> &'static str {
        match self {
            TelemetryEvent::OrderedTimeout { .. } => "ORDERED_EVENT_PROC_TIMEOUT",
            TelemetryEvent::SubscriberLimitExceeded { .. } => "SUBSCRIBER_EXCEED_MAXIMUM",
            TelemetryEvent::PublishError { .. } => "PUBLISH_ERROR",
            TelemetryEvent::Publish { .. } => "PUBLISH",
            TelemetryEvent::Subscribe { .. } => "SUBSCRIBE",
            TelemetryEvent::Unsubscribe { .. } => "UNSUBSCRIBE",
        }
    }

    /// Fault records as opposed to usage statistics
    pub fn is_fault(&self) -> bool {
        matches!(
            self,
            TelemetryEvent::OrderedTimeout { .. }
                | TelemetryEvent::SubscriberLimitExceeded { .. }
                | TelemetryEvent::PublishError { .. }
        )
    }
}

/// Sink for telemetry records.
///
/// Emission never fails from the caller's point of view.
pub trait TelemetrySink: Clone + Send + Sync + 'static {
    fn emit(&self, event: TelemetryEvent);
}
