// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake liveness monitor for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{DeathRecipient, LivenessMonitor};
use ces_core::ListenerId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Holds recipients so tests can simulate process death
#[derive(Clone, Default)]
pub struct FakeLivenessMonitor {
    recipients: Arc<Mutex<HashMap<ListenerId, DeathRecipient>>>,
}

impl FakeLivenessMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_watching(&self, id: &ListenerId) -> bool {
        self.recipients
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(id)
    }

    pub fn watched_count(&self) -> usize {
        self.recipients
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Fire the listener's death recipient. Returns false if it was not watched.
    pub fn kill(&self, id: &ListenerId) -> bool {
        let recipient = self
            .recipients
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(id);
        match recipient {
            Some(recipient) => recipient.notify_death(),
            None => false,
        }
    }
}

impl LivenessMonitor for FakeLivenessMonitor {
    fn watch(&self, recipient: DeathRecipient) {
        self.recipients
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(recipient.id().clone(), recipient);
    }

    fn unwatch(&self, id: &ListenerId) {
        self.recipients
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(id);
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
