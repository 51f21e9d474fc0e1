// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Install-time (static) subscribers, reached outside the live registry

mod noop;

pub use noop::NoOpStaticSubscriberAdapter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeStaticSubscriberAdapter;

use async_trait::async_trait;
use ces_core::EventRecord;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StaticSubscriberError {
    #[error("static subscriber dispatch failed: {0}")]
    Dispatch(String),
}

/// Forwards published events to statically declared subscribers.
///
/// The broker calls this fire-and-forget; errors are logged only.
#[async_trait]
pub trait StaticSubscriberAdapter: Clone + Send + Sync + 'static {
    async fn publish(&self, record: &EventRecord) -> Result<(), StaticSubscriberError>;
}
