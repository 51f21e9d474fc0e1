// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake telemetry sink for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{TelemetryEvent, TelemetrySink};
use std::sync::{Arc, Mutex};

/// Records every emitted telemetry event
#[derive(Clone, Default)]
pub struct FakeTelemetry {
    events: Arc<Mutex<Vec<TelemetryEvent>>>,
}

impl FakeTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of records of the given kind (see [`TelemetryEvent::kind`])
    pub fn count(&self, kind: &str) -> usize {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|e| e.kind() == kind)
            .count()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

impl TelemetrySink for FakeTelemetry {
    fn emit(&self, event: TelemetryEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
