// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identity resolver with no backing service.

use super::{user_of_uid, IdentityError, IdentityResolver};
use ces_core::{TokenId, Uid};

/// Resolver that grants nothing.
///
/// Users are derived from the uid; no caller is a system app or subsystem and
/// no token holds any permission. Suitable for standalone deployments where
/// only unprivileged, permission-free events flow.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpIdentityResolver;

impl NoOpIdentityResolver {
    pub fn new() -> Self {
        Self
    }
}

impl IdentityResolver for NoOpIdentityResolver {
    fn is_system_app(&self, _uid: Uid) -> Result<bool, IdentityError> {
        Ok(false)
    }

    fn resolve_current_user(&self, uid: Uid) -> Result<i32, IdentityError> {
        Ok(user_of_uid(uid))
    }

    fn verify_token(&self, _token: TokenId, _permission: &str) -> Result<bool, IdentityError> {
        Ok(false)
    }

    fn is_native_token(&self, _token: TokenId) -> Result<bool, IdentityError> {
        Ok(false)
    }
}
