// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ces-core: data model for the common event broker
//!
//! This crate provides:
//! - Event payloads, subscribe and publish options
//! - Matching rules and caller identity conventions
//! - Listener handles, clocks, id generation and configuration

pub mod clock;
pub mod config;
pub mod id;
pub mod identity;
pub mod listener;
pub mod matching;
pub mod publish;
pub mod record;
pub mod subscribe;
pub mod support;
pub mod want;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{BrokerConfig, ConfigError};
pub use id::ListenerId;
pub use identity::{
    is_system_user, user_label, CallerIdentity, EventRecordInfo, TokenId, Uid, ALL_USER,
    CURRENT_USER, UNDEFINED_PID, UNDEFINED_USER,
};
pub use listener::{CommonEventListener, ListenerHandle, WeakListener};
pub use matching::MatchingSkills;
pub use publish::PublishInfo;
pub use record::EventRecord;
pub use subscribe::{SubscribeInfo, ThreadMode};
pub use support::EventSupport;
pub use want::{CommonEventData, Want};
