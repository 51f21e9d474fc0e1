// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake static subscriber adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{StaticSubscriberAdapter, StaticSubscriberError};
use async_trait::async_trait;
use ces_core::EventRecord;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct FakeStaticState {
    published: Vec<EventRecord>,
    fail: bool,
}

/// Records forwarded events; can be told to fail
#[derive(Clone, Default)]
pub struct FakeStaticSubscriberAdapter {
    inner: Arc<Mutex<FakeStaticState>>,
}

impl FakeStaticSubscriberAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Event names forwarded so far, in order
    pub fn published(&self) -> Vec<String> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .published
            .iter()
            .map(|r| r.action().to_string())
            .collect()
    }

    pub fn records(&self) -> Vec<EventRecord> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .published
            .clone()
    }

    pub fn set_fail(&self, fail: bool) {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).fail = fail;
    }
}

#[async_trait]
impl StaticSubscriberAdapter for FakeStaticSubscriberAdapter {
    async fn publish(&self, record: &EventRecord) -> Result<(), StaticSubscriberError> {
        let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        state.published.push(record.clone());
        if state.fail {
            return Err(StaticSubscriberError::Dispatch(format!(
                "no extension for {}",
                record.action()
            )));
        }
        Ok(())
    }
}
