// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Well-known system event names and legacy aliases
//!
//! Events listed here are "system" events: only subsystems and system apps
//! may publish them.

use std::collections::{HashMap, HashSet};

pub mod names {
    pub const BOOT_COMPLETED: &str = "usual.event.BOOT_COMPLETED";
    pub const LOCKED_BOOT_COMPLETED: &str = "usual.event.LOCKED_BOOT_COMPLETED";
    pub const SHUTDOWN: &str = "usual.event.SHUTDOWN";
    pub const SCREEN_ON: &str = "usual.event.SCREEN_ON";
    pub const SCREEN_OFF: &str = "usual.event.SCREEN_OFF";
    pub const TIME_TICK: &str = "usual.event.TIME_TICK";
    pub const TIME_CHANGED: &str = "usual.event.TIME_CHANGED";
    pub const TIMEZONE_CHANGED: &str = "usual.event.TIMEZONE_CHANGED";
    pub const BATTERY_CHANGED: &str = "usual.event.BATTERY_CHANGED";
    pub const POWER_CONNECTED: &str = "usual.event.POWER_CONNECTED";
    pub const POWER_DISCONNECTED: &str = "usual.event.POWER_DISCONNECTED";
    pub const PACKAGE_ADDED: &str = "usual.event.PACKAGE_ADDED";
    pub const PACKAGE_REMOVED: &str = "usual.event.PACKAGE_REMOVED";
    pub const PACKAGE_CHANGED: &str = "usual.event.PACKAGE_CHANGED";
    pub const CONNECTIVITY_CHANGE: &str = "usual.event.CONNECTIVITY_CHANGE";

    pub const USER_SWITCHED: &str = "usual.event.USER_SWITCHED";
    pub const USER_STARTING: &str = "usual.event.USER_STARTING";
    pub const USER_STOPPING: &str = "usual.event.USER_STOPPING";
    pub const USER_ADDED: &str = "usual.event.USER_ADDED";
    pub const USER_REMOVED: &str = "usual.event.USER_REMOVED";

    pub const WIFI_SCAN_FINISHED: &str = "usual.event.wifi.SCAN_FINISHED";
    pub const WIFI_RSSI_VALUE: &str = "usual.event.wifi.RSSI_VALUE";
    pub const WIFI_AP_STA_JOIN: &str = "usual.event.wifi.WIFI_HS_STA_JOIN";
    pub const WIFI_AP_STA_LEAVE: &str = "usual.event.wifi.WIFI_HS_STA_LEAVE";
    pub const WIFI_MPLINK_STATE_CHANGE: &str = "usual.event.wifi.mplink.STATE_CHANGE";
    pub const WIFI_P2P_CONN_STATE: &str = "usual.event.wifi.p2p.CONN_STATE_CHANGE";
    pub const WIFI_P2P_STATE_CHANGED: &str = "usual.event.wifi.p2p.STATE_CHANGE";
    pub const WIFI_P2P_PEERS_STATE_CHANGED: &str = "usual.event.wifi.p2p.DEVICES_CHANGE";
    pub const WIFI_P2P_PEERS_DISCOVERY_STATE_CHANGED: &str =
        "usual.event.wifi.p2p.PEER_DISCOVERY_STATE_CHANGE";
    pub const WIFI_P2P_CURRENT_DEVICE_STATE_CHANGED: &str =
        "usual.event.wifi.p2p.CURRENT_DEVICE_CHANGE";
    pub const WIFI_P2P_GROUP_STATE_CHANGED: &str = "usual.event.wifi.p2p.GROUP_STATE_CHANGED";

    pub const BLUETOOTH_HANDSFREE_AG_CONNECT_STATE_UPDATE: &str =
        "usual.event.bluetooth.handsfree.ag.CONNECT_STATE_UPDATE";
    pub const BLUETOOTH_HANDSFREE_AG_CURRENT_DEVICE_UPDATE: &str =
        "usual.event.bluetooth.handsfree.ag.CURRENT_DEVICE_UPDATE";
    pub const BLUETOOTH_HANDSFREE_AG_AUDIO_STATE_UPDATE: &str =
        "usual.event.bluetooth.handsfree.ag.AUDIO_STATE_UPDATE";
    pub const BLUETOOTH_A2DPSOURCE_CONNECT_STATE_UPDATE: &str =
        "usual.event.bluetooth.a2dpsource.CONNECT_STATE_UPDATE";
    pub const BLUETOOTH_A2DPSOURCE_CURRENT_DEVICE_UPDATE: &str =
        "usual.event.bluetooth.a2dpsource.CURRENT_DEVICE_UPDATE";
    pub const BLUETOOTH_A2DPSOURCE_PLAYING_STATE_UPDATE: &str =
        "usual.event.bluetooth.a2dpsource.PLAYING_STATE_UPDATE";
    pub const BLUETOOTH_A2DPSOURCE_CODEC_VALUE_UPDATE: &str =
        "usual.event.bluetooth.a2dpsource.CODEC_VALUE_UPDATE";
    pub const BLUETOOTH_REMOTEDEVICE_DISCOVERED: &str =
        "usual.event.bluetooth.remotedevice.DISCOVERED";
    pub const BLUETOOTH_REMOTEDEVICE_CLASS_VALUE_UPDATE: &str =
        "usual.event.bluetooth.remotedevice.CLASS_VALUE_UPDATE";
    pub const BLUETOOTH_REMOTEDEVICE_ACL_CONNECTED: &str =
        "usual.event.bluetooth.remotedevice.ACL_CONNECTED";
    pub const BLUETOOTH_REMOTEDEVICE_ACL_DISCONNECTED: &str =
        "usual.event.bluetooth.remotedevice.ACL_DISCONNECTED";
    pub const BLUETOOTH_REMOTEDEVICE_NAME_UPDATE: &str =
        "usual.event.bluetooth.remotedevice.NAME_UPDATE";
    pub const BLUETOOTH_REMOTEDEVICE_PAIR_STATE: &str =
        "usual.event.bluetooth.remotedevice.PAIR_STATE";
    pub const BLUETOOTH_REMOTEDEVICE_BATTERY_VALUE_UPDATE: &str =
        "usual.event.bluetooth.remotedevice.BATTERY_VALUE_UPDATE";
    pub const BLUETOOTH_REMOTEDEVICE_UUID_VALUE: &str =
        "usual.event.bluetooth.remotedevice.UUID_VALUE";
    pub const BLUETOOTH_REMOTEDEVICE_PAIRING_REQ: &str =
        "usual.event.bluetooth.remotedevice.PAIRING_REQ";
    pub const BLUETOOTH_HOST_STATE_UPDATE: &str = "usual.event.bluetooth.host.STATE_UPDATE";
    pub const BLUETOOTH_HOST_REQ_ENABLE: &str = "usual.event.bluetooth.host.REQ_ENABLE";
    pub const BLUETOOTH_HOST_REQ_DISABLE: &str = "usual.event.bluetooth.host.REQ_DISABLE";
    pub const BLUETOOTH_HOST_SCAN_MODE_UPDATE: &str =
        "usual.event.bluetooth.host.SCAN_MODE_UPDATE";
    pub const BLUETOOTH_HOST_DISCOVERY_STARTED: &str =
        "usual.event.bluetooth.host.DISCOVERY_STARTED";
    pub const BLUETOOTH_HOST_DISCOVERY_FINISHED: &str =
        "usual.event.bluetooth.host.DISCOVERY_FINISHED";
    pub const BLUETOOTH_HOST_NAME_UPDATE: &str = "usual.event.bluetooth.host.NAME_UPDATE";
    pub const BLUETOOTH_A2DPSINK_CONNECT_STATE_UPDATE: &str =
        "usual.event.bluetooth.a2dpsink.CONNECT_STATE_UPDATE";
    pub const BLUETOOTH_A2DPSINK_PLAYING_STATE_UPDATE: &str =
        "usual.event.bluetooth.a2dpsink.PLAYING_STATE_UPDATE";
    pub const BLUETOOTH_A2DPSINK_AUDIO_STATE_UPDATE: &str =
        "usual.event.bluetooth.a2dpsink.AUDIO_STATE_UPDATE";

    pub const NFC_ACTION_RF_FIELD_ON_DETECTED: &str =
        "usual.event.nfc.action.RF_FIELD_ON_DETECTED";
    pub const NFC_ACTION_RF_FIELD_OFF_DETECTED: &str =
        "usual.event.nfc.action.RF_FIELD_OFF_DETECTED";

    pub const ABILITY_ADDED: &str = "common.event.ABILITY_ADDED";
    pub const ABILITY_REMOVED: &str = "common.event.ABILITY_REMOVED";
    pub const ABILITY_UPDATED: &str = "common.event.ABILITY_UPDATED";

    pub const DISK_REMOVED: &str = "usual.event.data.DISK_REMOVED";
    pub const DISK_UNMOUNTED: &str = "usual.event.data.DISK_UNMOUNTED";
    pub const DISK_MOUNTED: &str = "usual.event.data.DISK_MOUNTED";
    pub const DISK_BAD_REMOVAL: &str = "usual.event.data.DISK_BAD_REMOVAL";
    pub const DISK_UNMOUNTABLE: &str = "usual.event.data.DISK_UNMOUNTABLE";
    pub const DISK_EJECT: &str = "usual.event.data.DISK_EJECT";
    pub const VOLUME_REMOVED: &str = "usual.event.data.VOLUME_REMOVED";
    pub const VOLUME_UNMOUNTED: &str = "usual.event.data.VOLUME_UNMOUNTED";
    pub const VOLUME_MOUNTED: &str = "usual.event.data.VOLUME_MOUNTED";
    pub const VOLUME_BAD_REMOVAL: &str = "usual.event.data.VOLUME_BAD_REMOVAL";
    pub const VOLUME_EJECT: &str = "usual.event.data.VOLUME_EJECT";

    pub const VISIBLE_ACCOUNTS_UPDATED: &str = "usual.event.data.VISIBLE_ACCOUNTS_UPDATED";
    pub const ACCOUNT_DELETED: &str = "usual.event.data.ACCOUNT_DELETED";
    pub const FOUNDATION_READY: &str = "common.event.FOUNDATION_READY";
    pub const SLOT_CHANGE: &str = "usual.event.SLOT_CHANGE";
    pub const SMS_RECEIVE_COMPLETED: &str = "usual.event.SMS_RECEIVE_COMPLETED";
}

/// Every name in [`names`]
pub const SYSTEM_EVENTS: &[&str] = &[
    names::BOOT_COMPLETED,
    names::LOCKED_BOOT_COMPLETED,
    names::SHUTDOWN,
    names::SCREEN_ON,
    names::SCREEN_OFF,
    names::TIME_TICK,
    names::TIME_CHANGED,
    names::TIMEZONE_CHANGED,
    names::BATTERY_CHANGED,
    names::POWER_CONNECTED,
    names::POWER_DISCONNECTED,
    names::PACKAGE_ADDED,
    names::PACKAGE_REMOVED,
    names::PACKAGE_CHANGED,
    names::CONNECTIVITY_CHANGE,
    names::USER_SWITCHED,
    names::USER_STARTING,
    names::USER_STOPPING,
    names::USER_ADDED,
    names::USER_REMOVED,
    names::WIFI_SCAN_FINISHED,
    names::WIFI_RSSI_VALUE,
    names::WIFI_AP_STA_JOIN,
    names::WIFI_AP_STA_LEAVE,
    names::WIFI_MPLINK_STATE_CHANGE,
    names::WIFI_P2P_CONN_STATE,
    names::WIFI_P2P_STATE_CHANGED,
    names::WIFI_P2P_PEERS_STATE_CHANGED,
    names::WIFI_P2P_PEERS_DISCOVERY_STATE_CHANGED,
    names::WIFI_P2P_CURRENT_DEVICE_STATE_CHANGED,
    names::WIFI_P2P_GROUP_STATE_CHANGED,
    names::BLUETOOTH_HANDSFREE_AG_CONNECT_STATE_UPDATE,
    names::BLUETOOTH_HANDSFREE_AG_CURRENT_DEVICE_UPDATE,
    names::BLUETOOTH_HANDSFREE_AG_AUDIO_STATE_UPDATE,
    names::BLUETOOTH_A2DPSOURCE_CONNECT_STATE_UPDATE,
    names::BLUETOOTH_A2DPSOURCE_CURRENT_DEVICE_UPDATE,
    names::BLUETOOTH_A2DPSOURCE_PLAYING_STATE_UPDATE,
    names::BLUETOOTH_A2DPSOURCE_CODEC_VALUE_UPDATE,
    names::BLUETOOTH_REMOTEDEVICE_DISCOVERED,
    names::BLUETOOTH_REMOTEDEVICE_CLASS_VALUE_UPDATE,
    names::BLUETOOTH_REMOTEDEVICE_ACL_CONNECTED,
    names::BLUETOOTH_REMOTEDEVICE_ACL_DISCONNECTED,
    names::BLUETOOTH_REMOTEDEVICE_NAME_UPDATE,
    names::BLUETOOTH_REMOTEDEVICE_PAIR_STATE,
    names::BLUETOOTH_REMOTEDEVICE_BATTERY_VALUE_UPDATE,
    names::BLUETOOTH_REMOTEDEVICE_UUID_VALUE,
    names::BLUETOOTH_REMOTEDEVICE_PAIRING_REQ,
    names::BLUETOOTH_HOST_STATE_UPDATE,
    names::BLUETOOTH_HOST_REQ_ENABLE,
    names::BLUETOOTH_HOST_REQ_DISABLE,
    names::BLUETOOTH_HOST_SCAN_MODE_UPDATE,
    names::BLUETOOTH_HOST_DISCOVERY_STARTED,
    names::BLUETOOTH_HOST_DISCOVERY_FINISHED,
    names::BLUETOOTH_HOST_NAME_UPDATE,
    names::BLUETOOTH_A2DPSINK_CONNECT_STATE_UPDATE,
    names::BLUETOOTH_A2DPSINK_PLAYING_STATE_UPDATE,
    names::BLUETOOTH_A2DPSINK_AUDIO_STATE_UPDATE,
    names::NFC_ACTION_RF_FIELD_ON_DETECTED,
    names::NFC_ACTION_RF_FIELD_OFF_DETECTED,
    names::ABILITY_ADDED,
    names::ABILITY_REMOVED,
    names::ABILITY_UPDATED,
    names::DISK_REMOVED,
    names::DISK_UNMOUNTED,
    names::DISK_MOUNTED,
    names::DISK_BAD_REMOVAL,
    names::DISK_UNMOUNTABLE,
    names::DISK_EJECT,
    names::VOLUME_REMOVED,
    names::VOLUME_UNMOUNTED,
    names::VOLUME_MOUNTED,
    names::VOLUME_BAD_REMOVAL,
    names::VOLUME_EJECT,
    names::VISIBLE_ACCOUNTS_UPDATED,
    names::ACCOUNT_DELETED,
    names::FOUNDATION_READY,
    names::SLOT_CHANGE,
    names::SMS_RECEIVE_COMPLETED,
];

/// Storage events moved under `usual.event.data.`; old subscribers still
/// listen on the flat names.
pub const LEGACY_ALIASES: &[(&str, &str)] = &[
    (names::DISK_REMOVED, "usual.event.DISK_REMOVED"),
    (names::DISK_UNMOUNTED, "usual.event.DISK_UNMOUNTED"),
    (names::DISK_MOUNTED, "usual.event.DISK_MOUNTED"),
    (names::DISK_BAD_REMOVAL, "usual.event.DISK_BAD_REMOVAL"),
    (names::DISK_UNMOUNTABLE, "usual.event.DISK_UNMOUNTABLE"),
    (names::DISK_EJECT, "usual.event.DISK_EJECT"),
    (names::VOLUME_REMOVED, "usual.event.VOLUME_REMOVED"),
    (names::VOLUME_UNMOUNTED, "usual.event.VOLUME_UNMOUNTED"),
    (names::VOLUME_MOUNTED, "usual.event.VOLUME_MOUNTED"),
    (names::VOLUME_BAD_REMOVAL, "usual.event.VOLUME_BAD_REMOVAL"),
    (names::VOLUME_EJECT, "usual.event.VOLUME_EJECT"),
];

/// Classification of event names: which are system events, and which have
/// a legacy alias that must be published alongside them.
#[derive(Debug, Clone)]
pub struct EventSupport {
    system_events: HashSet<String>,
    aliases: HashMap<String, String>,
}

impl EventSupport {
    /// Empty classification: nothing is a system event, nothing is aliased
    pub fn empty() -> Self {
        Self {
            system_events: HashSet::new(),
            aliases: HashMap::new(),
        }
    }

    pub fn with_system_event(mut self, event: impl Into<String>) -> Self {
        self.system_events.insert(event.into());
        self
    }

    pub fn with_alias(mut self, event: impl Into<String>, alias: impl Into<String>) -> Self {
        self.aliases.insert(event.into(), alias.into());
        self
    }

    pub fn is_system_event(&self, event: &str) -> bool {
        self.system_events.contains(event)
    }

    /// Legacy name to republish under, if any
    pub fn mapped_alias(&self, event: &str) -> Option<&str> {
        self.aliases.get(event).map(String::as_str)
    }
}

impl Default for EventSupport {
    fn default() -> Self {
        let mut support = Self::empty();
        for event in SYSTEM_EVENTS {
            support.system_events.insert((*event).to_string());
        }
        for (event, alias) in LEGACY_ALIASES {
            support
                .aliases
                .insert((*event).to_string(), (*alias).to_string());
        }
        support
    }
}
