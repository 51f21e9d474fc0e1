// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Caller identity and user-id conventions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Subscribe to / publish for every user
pub const ALL_USER: i32 = -1;
/// Resolve to the caller's own user
pub const CURRENT_USER: i32 = -2;
/// No user given; resolution depends on caller privilege
pub const UNDEFINED_USER: i32 = -3;
/// Pid reported for calls forwarded by a proxy
pub const UNDEFINED_PID: i32 = -1;
/// Reserved system user range (inclusive)
pub const SYSTEM_USER_BEGIN: i32 = 0;
pub const SYSTEM_USER_END: i32 = 99;

/// Process uid
pub type Uid = u32;
/// Access token id
pub type TokenId = u64;

/// Returns true for user ids in the reserved system range
pub fn is_system_user(user_id: i32) -> bool {
    (SYSTEM_USER_BEGIN..=SYSTEM_USER_END).contains(&user_id)
}

/// Display form used in diagnostics
pub fn user_label(user_id: i32) -> String {
    match user_id {
        ALL_USER => "ALL_USER".to_string(),
        UNDEFINED_USER => "UNDEFINED_USER".to_string(),
        CURRENT_USER => "CURRENT_USER".to_string(),
        id => id.to_string(),
    }
}

/// Raw identity of whoever is calling into the broker
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    pub pid: i32,
    pub uid: Uid,
    pub token_id: TokenId,
    pub bundle_name: String,
}

impl CallerIdentity {
    pub fn new(pid: i32, uid: Uid, token_id: TokenId, bundle_name: impl Into<String>) -> Self {
        Self {
            pid,
            uid,
            token_id,
            bundle_name: bundle_name.into(),
        }
    }

    /// True when the call was forwarded on someone's behalf
    pub fn is_proxy(&self) -> bool {
        self.pid == UNDEFINED_PID
    }
}

/// Caller identity after privilege resolution
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecordInfo {
    pub pid: i32,
    pub uid: Uid,
    pub token_id: TokenId,
    pub bundle_name: String,
    pub is_subsystem: bool,
    pub is_system_app: bool,
    pub is_proxy: bool,
}

impl EventRecordInfo {
    pub fn from_caller(caller: &CallerIdentity, is_subsystem: bool, is_system_app: bool) -> Self {
        Self {
            pid: caller.pid,
            uid: caller.uid,
            token_id: caller.token_id,
            bundle_name: caller.bundle_name.clone(),
            is_subsystem,
            is_system_app,
            is_proxy: caller.is_proxy(),
        }
    }

    /// Subsystem or system app calling directly (not through a proxy)
    pub fn is_privileged(&self) -> bool {
        (self.is_subsystem || self.is_system_app) && !self.is_proxy
    }
}

impl fmt::Display for EventRecordInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (pid = {}, uid = {})",
            self.bundle_name, self.pid, self.uid
        )
    }
}
