// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Permission gate: may this subscriber see this event?
//!
//! Three checks run in order and any failure skips the receiver:
//! 1. the event's own permission requirement, held by the subscriber
//! 2. the subscriber's declared permission, held by the publisher
//! 3. the publisher's required permissions, all held by the subscriber
//!
//! Identity lookups that fail count as denials.

use crate::delivery::DeliveryState;
use crate::registry::SubscriberRecord;
use ces_adapters::IdentityResolver;
use ces_core::support::names;
use ces_core::{EventRecord, TokenId};
use std::collections::HashMap;
use std::sync::Arc;

/// Permission holding the right to publish sticky events
pub const STICKY_PERMISSION: &str = "ohos.permission.COMMONEVENT_STICKY";

const RECEIVER_STARTUP_COMPLETED: &str = "ohos.permission.RECEIVER_STARTUP_COMPLETED";
const MANAGE_LOCAL_ACCOUNTS: &str = "ohos.permission.MANAGE_LOCAL_ACCOUNTS";
const INTERACT_ACROSS_LOCAL_ACCOUNTS: &str = "ohos.permission.INTERACT_ACROSS_LOCAL_ACCOUNTS";
const LOCATION: &str = "ohos.permission.LOCATION";
const GET_WIFI_INFO: &str = "ohos.permission.GET_WIFI_INFO";
const MPLINK_CHANGE_STATE: &str = "ohos.permission.MPLINK_CHANGE_STATE";
const USE_BLUETOOTH: &str = "ohos.permission.USE_BLUETOOTH";
const DISCOVER_BLUETOOTH: &str = "ohos.permission.DISCOVER_BLUETOOTH";
const MANAGE_SECURE_SETTINGS: &str = "ohos.permission.MANAGE_SECURE_SETTINGS";
const LISTEN_BUNDLE_CHANGE: &str = "ohos.permission.LISTEN_BUNDLE_CHANGE";
const STORAGE_MANAGER: &str = "ohos.permission.STORAGE_MANAGER";
const GET_APP_ACCOUNTS: &str = "ohos.permission.GET_APP_ACCOUNTS";
const NOTIFICATION_CONTROLLER: &str = "ohos.permission.NOTIFICATION_CONTROLLER";
const RECEIVE_SMS: &str = "ohos.permission.RECEIVE_SMS";

/// How multiple permission names combine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    /// Exactly one name
    Default,
    /// Every name must be held
    And,
    /// Any one name suffices
    Or,
}

/// Permission requirement attached to an event name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventPermission {
    pub state: PermissionState,
    pub names: Vec<String>,
    /// Usage of this permission is recorded on delivery
    pub sensitive: bool,
}

impl EventPermission {
    pub fn single(name: &str) -> Self {
        Self {
            state: PermissionState::Default,
            names: vec![name.to_string()],
            sensitive: false,
        }
    }

    pub fn all_of(names: &[&str]) -> Self {
        Self {
            state: PermissionState::And,
            names: names.iter().map(|n| n.to_string()).collect(),
            sensitive: false,
        }
    }

    pub fn any_of(names: &[&str]) -> Self {
        Self {
            state: PermissionState::Or,
            names: names.iter().map(|n| n.to_string()).collect(),
            sensitive: false,
        }
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }
}

/// Event name to permission requirement
#[derive(Debug, Clone)]
pub struct PermissionTable {
    entries: HashMap<String, EventPermission>,
}

impl PermissionTable {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn with_entry(mut self, event: impl Into<String>, permission: EventPermission) -> Self {
        self.entries.insert(event.into(), permission);
        self
    }

    pub fn get(&self, event: &str) -> Option<&EventPermission> {
        self.entries.get(event)
    }

    pub fn is_sensitive(&self, event: &str) -> bool {
        self.get(event).is_some_and(|p| p.sensitive)
    }

    fn with_all(mut self, events: &[&str], permission: EventPermission) -> Self {
        for event in events {
            self.entries.insert(event.to_string(), permission.clone());
        }
        self
    }
}

impl Default for PermissionTable {
    fn default() -> Self {
        use names::*;
        Self::empty()
            .with_all(
                &[BOOT_COMPLETED, LOCKED_BOOT_COMPLETED, FOUNDATION_READY],
                EventPermission::single(RECEIVER_STARTUP_COMPLETED),
            )
            .with_all(
                &[USER_SWITCHED, USER_ADDED, USER_REMOVED],
                EventPermission::single(MANAGE_LOCAL_ACCOUNTS),
            )
            .with_all(
                &[USER_STARTING, USER_STOPPING, ACCOUNT_DELETED],
                EventPermission::single(INTERACT_ACROSS_LOCAL_ACCOUNTS),
            )
            .with_entry(WIFI_SCAN_FINISHED, EventPermission::single(LOCATION))
            .with_all(
                &[
                    WIFI_RSSI_VALUE,
                    WIFI_AP_STA_JOIN,
                    WIFI_AP_STA_LEAVE,
                    WIFI_P2P_STATE_CHANGED,
                    WIFI_P2P_PEERS_STATE_CHANGED,
                    WIFI_P2P_PEERS_DISCOVERY_STATE_CHANGED,
                    WIFI_P2P_CURRENT_DEVICE_STATE_CHANGED,
                    WIFI_P2P_GROUP_STATE_CHANGED,
                ],
                EventPermission::single(GET_WIFI_INFO),
            )
            .with_entry(
                WIFI_MPLINK_STATE_CHANGE,
                EventPermission::single(MPLINK_CHANGE_STATE),
            )
            .with_entry(
                WIFI_P2P_CONN_STATE,
                EventPermission::all_of(&[GET_WIFI_INFO, LOCATION]),
            )
            .with_all(
                &[
                    BLUETOOTH_HANDSFREE_AG_CONNECT_STATE_UPDATE,
                    BLUETOOTH_HANDSFREE_AG_CURRENT_DEVICE_UPDATE,
                    BLUETOOTH_HANDSFREE_AG_AUDIO_STATE_UPDATE,
                    BLUETOOTH_A2DPSOURCE_CONNECT_STATE_UPDATE,
                    BLUETOOTH_A2DPSOURCE_CURRENT_DEVICE_UPDATE,
                    BLUETOOTH_A2DPSOURCE_PLAYING_STATE_UPDATE,
                    BLUETOOTH_A2DPSOURCE_CODEC_VALUE_UPDATE,
                    BLUETOOTH_REMOTEDEVICE_CLASS_VALUE_UPDATE,
                    BLUETOOTH_REMOTEDEVICE_ACL_CONNECTED,
                    BLUETOOTH_REMOTEDEVICE_ACL_DISCONNECTED,
                    BLUETOOTH_REMOTEDEVICE_NAME_UPDATE,
                    BLUETOOTH_REMOTEDEVICE_PAIR_STATE,
                    BLUETOOTH_REMOTEDEVICE_BATTERY_VALUE_UPDATE,
                    BLUETOOTH_HOST_STATE_UPDATE,
                    BLUETOOTH_HOST_REQ_ENABLE,
                    BLUETOOTH_HOST_REQ_DISABLE,
                    BLUETOOTH_HOST_SCAN_MODE_UPDATE,
                    BLUETOOTH_HOST_DISCOVERY_STARTED,
                    BLUETOOTH_HOST_DISCOVERY_FINISHED,
                    BLUETOOTH_HOST_NAME_UPDATE,
                    BLUETOOTH_A2DPSINK_CONNECT_STATE_UPDATE,
                    BLUETOOTH_A2DPSINK_PLAYING_STATE_UPDATE,
                    BLUETOOTH_A2DPSINK_AUDIO_STATE_UPDATE,
                ],
                EventPermission::single(USE_BLUETOOTH),
            )
            .with_entry(
                BLUETOOTH_REMOTEDEVICE_DISCOVERED,
                EventPermission::all_of(&[USE_BLUETOOTH, LOCATION]),
            )
            .with_all(
                &[
                    BLUETOOTH_REMOTEDEVICE_UUID_VALUE,
                    BLUETOOTH_REMOTEDEVICE_PAIRING_REQ,
                ],
                EventPermission::single(DISCOVER_BLUETOOTH),
            )
            .with_all(
                &[
                    NFC_ACTION_RF_FIELD_ON_DETECTED,
                    NFC_ACTION_RF_FIELD_OFF_DETECTED,
                ],
                EventPermission::single(MANAGE_SECURE_SETTINGS),
            )
            .with_all(
                &[ABILITY_ADDED, ABILITY_REMOVED, ABILITY_UPDATED],
                EventPermission::single(LISTEN_BUNDLE_CHANGE),
            )
            .with_all(
                &[
                    DISK_REMOVED,
                    DISK_UNMOUNTED,
                    DISK_MOUNTED,
                    DISK_BAD_REMOVAL,
                    DISK_UNMOUNTABLE,
                    DISK_EJECT,
                    VOLUME_REMOVED,
                    VOLUME_UNMOUNTED,
                    VOLUME_MOUNTED,
                    VOLUME_BAD_REMOVAL,
                    VOLUME_EJECT,
                ],
                EventPermission::single(STORAGE_MANAGER),
            )
            .with_entry(
                VISIBLE_ACCOUNTS_UPDATED,
                EventPermission::single(GET_APP_ACCOUNTS),
            )
            .with_entry(SLOT_CHANGE, EventPermission::single(NOTIFICATION_CONTROLLER))
            .with_entry(
                SMS_RECEIVE_COMPLETED,
                EventPermission::single(RECEIVE_SMS).sensitive(),
            )
    }
}

/// Decides whether a subscriber receives an event
#[derive(Clone)]
pub struct PermissionGate<I> {
    identity: I,
    table: Arc<PermissionTable>,
}

impl<I: IdentityResolver> PermissionGate<I> {
    pub fn new(identity: I, table: Arc<PermissionTable>) -> Self {
        Self { identity, table }
    }

    pub fn table(&self) -> &PermissionTable {
        &self.table
    }

    /// `Delivered` if every check passes, `Skipped` otherwise.
    ///
    /// Deterministic for fixed identity answers.
    pub fn check(&self, subscriber: &SubscriberRecord, record: &EventRecord) -> DeliveryState {
        if self.event_permission_held(subscriber, record)
            && self.subscriber_requirement_met(subscriber, record)
            && self.publisher_requirements_met(subscriber, record)
        {
            DeliveryState::Delivered
        } else {
            DeliveryState::Skipped
        }
    }

    /// Token check; lookup errors deny
    pub fn verify(&self, token: TokenId, permission: &str) -> bool {
        match self.identity.verify_token(token, permission) {
            Ok(granted) => granted,
            Err(e) => {
                tracing::warn!(token, permission, error = %e, "permission lookup failed, denying");
                false
            }
        }
    }

    fn event_permission_held(&self, subscriber: &SubscriberRecord, record: &EventRecord) -> bool {
        let caller = subscriber.caller();
        if !caller.is_proxy && (caller.is_subsystem || caller.is_system_app) {
            return true;
        }
        let Some(permission) = self.table.get(record.action()) else {
            return true;
        };

        let held = match (permission.names.as_slice(), permission.state) {
            ([], _) => true,
            ([name], _) => self.verify(caller.token_id, name),
            (names, PermissionState::And) => names.iter().all(|n| self.verify(caller.token_id, n)),
            (names, PermissionState::Or) => names.iter().any(|n| self.verify(caller.token_id, n)),
            (_, PermissionState::Default) => {
                tracing::warn!(event = record.action(), "malformed permission entry");
                false
            }
        };
        if !held {
            let joiner = match permission.state {
                PermissionState::Or => " or ",
                _ => " and ",
            };
            tracing::warn!(
                event = record.action(),
                subscriber = %caller,
                required = %permission.names.join(joiner),
                publisher = %record.publisher,
                "subscriber lacks event permission"
            );
        }
        held
    }

    fn subscriber_requirement_met(
        &self,
        subscriber: &SubscriberRecord,
        record: &EventRecord,
    ) -> bool {
        let required = &subscriber.info().permission;
        if required.is_empty() || self.verify(record.publisher.token_id, required) {
            return true;
        }
        tracing::warn!(
            event = record.action(),
            subscriber = %subscriber.caller(),
            required = %required,
            publisher = %record.publisher,
            "publisher lacks subscriber-required permission"
        );
        false
    }

    fn publisher_requirements_met(
        &self,
        subscriber: &SubscriberRecord,
        record: &EventRecord,
    ) -> bool {
        let token = subscriber.caller().token_id;
        match record
            .publish_info
            .subscriber_permissions
            .iter()
            .find(|p| !self.verify(token, p))
        {
            None => true,
            Some(missing) => {
                tracing::warn!(
                    event = record.action(),
                    subscriber = %subscriber.caller(),
                    required = %missing,
                    publisher = %record.publisher,
                    "subscriber lacks publisher-required permission"
                );
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "permission_tests.rs"]
mod tests;
