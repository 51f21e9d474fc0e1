// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for the broker's external collaborators

pub mod identity;
pub mod liveness;
pub mod static_subscriber;
pub mod telemetry;
pub mod traced;

#[cfg(any(test, feature = "test-support"))]
pub mod listener;

pub use identity::{user_of_uid, IdentityError, IdentityResolver, NoOpIdentityResolver};
pub use liveness::{DeathRecipient, LivenessMonitor, NoOpLivenessMonitor};
pub use static_subscriber::{
    NoOpStaticSubscriberAdapter, StaticSubscriberAdapter, StaticSubscriberError,
};
pub use telemetry::{TelemetryEvent, TelemetryOrigin, TelemetrySink, TracingTelemetry};
pub use traced::{TracedIdentityResolver, TracedStaticSubscriberAdapter};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use identity::{FakeIdentityResolver, IdentityCall};
#[cfg(any(test, feature = "test-support"))]
pub use listener::{Delivery, RecordingListener};
#[cfg(any(test, feature = "test-support"))]
pub use liveness::FakeLivenessMonitor;
#[cfg(any(test, feature = "test-support"))]
pub use static_subscriber::FakeStaticSubscriberAdapter;
#[cfg(any(test, feature = "test-support"))]
pub use telemetry::FakeTelemetry;
