// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event records: one publish attempt with everything the broker decided
//! about it at publish time

use crate::identity::EventRecordInfo;
use crate::publish::PublishInfo;
use crate::want::CommonEventData;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One publish attempt.
///
/// Immutable after creation except `data.code` / `data.data`, which ordered
/// receivers rewrite while the event travels down the receiver chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub data: CommonEventData,
    pub publish_info: PublishInfo,
    pub record_time: DateTime<Utc>,
    pub publisher: EventRecordInfo,
    /// Resolved target user
    pub user_id: i32,
    pub is_system_event: bool,
}

impl EventRecord {
    pub fn action(&self) -> &str {
        self.data.action()
    }

    pub fn is_ordered(&self) -> bool {
        self.publish_info.ordered
    }

    pub fn is_sticky(&self) -> bool {
        self.publish_info.sticky
    }

    /// Copy of this record published under another event name
    pub fn renamed(&self, action: impl Into<String>) -> Self {
        let mut record = self.clone();
        record.data.want.action = action.into();
        record
    }

    /// True if the publisher restricted delivery to a bundle other than `bundle_name`
    pub fn excludes_bundle(&self, bundle_name: &str) -> bool {
        !self.publish_info.bundle_name.is_empty() && self.publish_info.bundle_name != bundle_name
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
