// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Liveness monitor for in-process listeners, which never die separately.

use super::{DeathRecipient, LivenessMonitor};
use ces_core::ListenerId;

#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpLivenessMonitor;

impl NoOpLivenessMonitor {
    pub fn new() -> Self {
        Self
    }
}

impl LivenessMonitor for NoOpLivenessMonitor {
    fn watch(&self, _recipient: DeathRecipient) {}

    fn unwatch(&self, _id: &ListenerId) {}
}
