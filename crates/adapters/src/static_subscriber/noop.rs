// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op static subscriber adapter for deployments without install-time subscribers.

use super::{StaticSubscriberAdapter, StaticSubscriberError};
use async_trait::async_trait;
use ces_core::EventRecord;

#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpStaticSubscriberAdapter;

impl NoOpStaticSubscriberAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl StaticSubscriberAdapter for NoOpStaticSubscriberAdapter {
    async fn publish(&self, _record: &EventRecord) -> Result<(), StaticSubscriberError> {
        Ok(())
    }
}
