// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::identity::{IdentityError, IdentityResolver};
use crate::static_subscriber::{StaticSubscriberAdapter, StaticSubscriberError};
use async_trait::async_trait;
use ces_core::{EventRecord, TokenId, Uid};
use tracing::Instrument;

/// Wrapper that adds tracing to any IdentityResolver
#[derive(Clone)]
pub struct TracedIdentityResolver<I> {
    inner: I,
}

impl<I> TracedIdentityResolver<I> {
    pub fn new(inner: I) -> Self {
        Self { inner }
    }
}

impl<I: IdentityResolver> IdentityResolver for TracedIdentityResolver<I> {
    fn is_system_app(&self, uid: Uid) -> Result<bool, IdentityError> {
        let span = tracing::debug_span!("identity.is_system_app", uid);
        let _guard = span.enter();

        let result = self.inner.is_system_app(uid);
        match &result {
            Ok(system_app) => tracing::trace!(system_app, "resolved"),
            Err(e) => tracing::warn!(error = %e, "lookup failed"),
        }
        result
    }

    fn resolve_current_user(&self, uid: Uid) -> Result<i32, IdentityError> {
        let span = tracing::debug_span!("identity.resolve_current_user", uid);
        let _guard = span.enter();

        let result = self.inner.resolve_current_user(uid);
        match &result {
            Ok(user_id) => tracing::trace!(user_id, "resolved"),
            Err(e) => tracing::warn!(error = %e, "lookup failed"),
        }
        result
    }

    fn verify_token(&self, token: TokenId, permission: &str) -> Result<bool, IdentityError> {
        let span = tracing::debug_span!("identity.verify_token", token, permission);
        let _guard = span.enter();

        let result = self.inner.verify_token(token, permission);
        match &result {
            Ok(true) => tracing::trace!("granted"),
            Ok(false) => tracing::debug!("denied"),
            Err(e) => tracing::warn!(error = %e, "lookup failed"),
        }
        result
    }

    fn is_native_token(&self, token: TokenId) -> Result<bool, IdentityError> {
        let result = self.inner.is_native_token(token);
        tracing::trace!(token, native = ?result.as_ref().ok(), "checked");
        result
    }
}

/// Wrapper that adds tracing to any StaticSubscriberAdapter
#[derive(Clone)]
pub struct TracedStaticSubscriberAdapter<S> {
    inner: S,
}

impl<S> TracedStaticSubscriberAdapter<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S: StaticSubscriberAdapter> StaticSubscriberAdapter for TracedStaticSubscriberAdapter<S> {
    async fn publish(&self, record: &EventRecord) -> Result<(), StaticSubscriberError> {
        let span = tracing::info_span!(
            "static_subscriber.publish",
            event = record.action(),
            user_id = record.user_id
        );
        span.in_scope(|| tracing::info!(publisher = %record.publisher, "forwarding"));

        let start = std::time::Instant::now();
        let result = self.inner.publish(record).instrument(span.clone()).await;
        let elapsed = start.elapsed();

        span.in_scope(|| match &result {
            Ok(()) => tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "forwarded"),
            Err(e) => tracing::error!(
                elapsed_ms = elapsed.as_millis() as u64,
                error = %e,
                "forward failed"
            ),
        });

        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
