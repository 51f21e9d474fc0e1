// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Caller privilege resolution and target-user checks

use crate::error::BrokerError;
use ces_adapters::IdentityResolver;
use ces_core::{CallerIdentity, EventRecordInfo, ALL_USER, CURRENT_USER, UNDEFINED_USER};

/// Classify a caller as subsystem / system app.
///
/// The system-app lookup only runs for non-subsystem callers. Lookup
/// failures classify the caller as unprivileged.
pub fn resolve_caller<I: IdentityResolver>(
    identity: &I,
    caller: &CallerIdentity,
) -> EventRecordInfo {
    let is_subsystem = identity.is_native_token(caller.token_id).unwrap_or_else(|e| {
        tracing::warn!(uid = caller.uid, error = %e, "native token lookup failed");
        false
    });
    let is_system_app = !is_subsystem
        && identity.is_system_app(caller.uid).unwrap_or_else(|e| {
            tracing::warn!(uid = caller.uid, error = %e, "system app lookup failed");
            false
        });
    EventRecordInfo::from_caller(caller, is_subsystem, is_system_app)
}

/// Resolve the user id a call targets.
///
/// Privileged direct callers may name any user: `CURRENT_USER` resolves to
/// their own user and `UNDEFINED_USER` widens to `ALL_USER`. Everyone else
/// may only leave the user undefined, which resolves to their own user.
pub fn check_user_id<I: IdentityResolver>(
    identity: &I,
    caller: &EventRecordInfo,
    user_id: i32,
) -> Result<i32, BrokerError> {
    if user_id < UNDEFINED_USER {
        return Err(BrokerError::InvalidArgument(format!("invalid user id {user_id}")));
    }

    let own_user = || {
        identity.resolve_current_user(caller.uid).map_err(|e| {
            tracing::warn!(uid = caller.uid, error = %e, "user lookup failed");
            BrokerError::Unauthorized(format!("cannot resolve user of uid {}", caller.uid))
        })
    };

    if caller.is_privileged() {
        match user_id {
            CURRENT_USER => own_user(),
            UNDEFINED_USER => Ok(ALL_USER),
            other => Ok(other),
        }
    } else if user_id == UNDEFINED_USER {
        own_user()
    } else {
        Err(BrokerError::Unauthorized(format!(
            "{caller} may not target user {user_id}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ces_adapters::{FakeIdentityResolver, IdentityCall};
    use ces_core::UNDEFINED_PID;
    use yare::parameterized;

    const APP_UID: u32 = 20_010_001;

    fn caller(pid: i32) -> CallerIdentity {
        CallerIdentity::new(pid, APP_UID, 7, "com.example.app")
    }

    fn resolver() -> FakeIdentityResolver {
        let identity = FakeIdentityResolver::new();
        identity.set_user(APP_UID, 100);
        identity
    }

    #[test]
    fn subsystem_skips_system_app_lookup() {
        let identity = resolver();
        identity.set_native(7);
        let info = resolve_caller(&identity, &caller(10));

        assert!(info.is_subsystem);
        assert!(!info.is_system_app);
        assert!(!identity
            .calls()
            .iter()
            .any(|c| matches!(c, IdentityCall::IsSystemApp { .. })));
    }

    #[test]
    fn lookup_failure_is_unprivileged() {
        let identity = resolver();
        identity.set_native(7);
        identity.set_unavailable(true);
        let info = resolve_caller(&identity, &caller(10));
        assert!(!info.is_privileged());
    }

    #[parameterized(
        privileged_current = { true, 10, CURRENT_USER, Some(100) },
        privileged_undefined = { true, 10, UNDEFINED_USER, Some(ALL_USER) },
        privileged_explicit = { true, 10, 101, Some(101) },
        privileged_all = { true, 10, ALL_USER, Some(ALL_USER) },
        plain_undefined = { false, 10, UNDEFINED_USER, Some(100) },
        plain_current = { false, 10, CURRENT_USER, None },
        plain_explicit = { false, 10, 100, None },
        proxy_undefined = { true, UNDEFINED_PID, UNDEFINED_USER, Some(100) },
        proxy_explicit = { true, UNDEFINED_PID, 101, None },
        below_range = { true, 10, -4, None },
    )]
    fn user_id_resolution(system_app: bool, pid: i32, requested: i32, expected: Option<i32>) {
        let identity = resolver();
        if system_app {
            identity.set_system_app(APP_UID);
        }
        let info = resolve_caller(&identity, &caller(pid));
        assert_eq!(check_user_id(&identity, &info, requested).ok(), expected);
    }

    #[test]
    fn unresolvable_user_is_unauthorized() {
        let identity = FakeIdentityResolver::new();
        let info = resolve_caller(&identity, &caller(10));
        identity.set_unavailable(true);
        let err = check_user_id(&identity, &info, UNDEFINED_USER).unwrap_err();
        assert!(matches!(err, BrokerError::Unauthorized(_)));
    }
}
