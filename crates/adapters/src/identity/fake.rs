// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake identity resolver for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{user_of_uid, IdentityError, IdentityResolver};
use ces_core::{TokenId, Uid};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Recorded identity lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityCall {
    IsSystemApp { uid: Uid },
    ResolveCurrentUser { uid: Uid },
    VerifyToken { token: TokenId, permission: String },
    IsNativeToken { token: TokenId },
}

#[derive(Default)]
struct FakeIdentityState {
    system_apps: HashSet<Uid>,
    native_tokens: HashSet<TokenId>,
    grants: HashSet<(TokenId, String)>,
    users: HashMap<Uid, i32>,
    unavailable: bool,
    calls: Vec<IdentityCall>,
}

/// Fake identity resolver with programmable answers
#[derive(Clone, Default)]
pub struct FakeIdentityResolver {
    inner: Arc<Mutex<FakeIdentityState>>,
}

impl FakeIdentityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeIdentityState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Mark the uid as belonging to a system app
    pub fn set_system_app(&self, uid: Uid) {
        self.state().system_apps.insert(uid);
    }

    /// Mark the token as a native subsystem token
    pub fn set_native(&self, token: TokenId) {
        self.state().native_tokens.insert(token);
    }

    pub fn grant(&self, token: TokenId, permission: &str) {
        self.state().grants.insert((token, permission.to_string()));
    }

    pub fn revoke(&self, token: TokenId, permission: &str) {
        self.state().grants.remove(&(token, permission.to_string()));
    }

    /// Override the user a uid resolves to
    pub fn set_user(&self, uid: Uid, user_id: i32) {
        self.state().users.insert(uid, user_id);
    }

    /// Make every lookup fail with `Unavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state().unavailable = unavailable;
    }

    pub fn calls(&self) -> Vec<IdentityCall> {
        self.state().calls.clone()
    }

    fn record(&self, call: IdentityCall) -> Result<(), IdentityError> {
        let mut state = self.state();
        state.calls.push(call);
        if state.unavailable {
            return Err(IdentityError::Unavailable("fake outage".to_string()));
        }
        Ok(())
    }
}

impl IdentityResolver for FakeIdentityResolver {
    fn is_system_app(&self, uid: Uid) -> Result<bool, IdentityError> {
        self.record(IdentityCall::IsSystemApp { uid })?;
        Ok(self.state().system_apps.contains(&uid))
    }

    fn resolve_current_user(&self, uid: Uid) -> Result<i32, IdentityError> {
        self.record(IdentityCall::ResolveCurrentUser { uid })?;
        Ok(self
            .state()
            .users
            .get(&uid)
            .copied()
            .unwrap_or_else(|| user_of_uid(uid)))
    }

    fn verify_token(&self, token: TokenId, permission: &str) -> Result<bool, IdentityError> {
        self.record(IdentityCall::VerifyToken {
            token,
            permission: permission.to_string(),
        })?;
        Ok(self
            .state()
            .grants
            .contains(&(token, permission.to_string())))
    }

    fn is_native_token(&self, token: TokenId) -> Result<bool, IdentityError> {
        self.record(IdentityCall::IsNativeToken { token })?;
        Ok(self.state().native_tokens.contains(&token))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
