// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Caller identity lookups: system-app status, user resolution, token checks

mod noop;

pub use noop::NoOpIdentityResolver;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeIdentityResolver, IdentityCall};

use ces_core::{TokenId, Uid};
use thiserror::Error;

/// Uids are allocated in blocks of this size per OS user
pub const UID_PER_USER: Uid = 200_000;

/// User that owns a uid under the standard allocation scheme
pub fn user_of_uid(uid: Uid) -> i32 {
    (uid / UID_PER_USER) as i32
}

/// Errors from identity lookups
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("identity service unavailable: {0}")]
    Unavailable(String),
    #[error("unknown uid: {0}")]
    UnknownUid(Uid),
}

/// Synchronous lookups about callers.
///
/// Called from dispatch loops for every receiver, so implementations must
/// answer quickly. Callers treat any error as a denial.
pub trait IdentityResolver: Clone + Send + Sync + 'static {
    /// Whether the app owning `uid` is a system app
    fn is_system_app(&self, uid: Uid) -> Result<bool, IdentityError>;

    /// OS user the uid belongs to
    fn resolve_current_user(&self, uid: Uid) -> Result<i32, IdentityError>;

    /// Whether the access token holds the permission
    fn verify_token(&self, token: TokenId, permission: &str) -> Result<bool, IdentityError>;

    /// Whether the token belongs to a native subsystem process
    fn is_native_token(&self, token: TokenId) -> Result<bool, IdentityError>;
}
