// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subscribe-side options

use crate::identity::UNDEFINED_USER;
use crate::matching::MatchingSkills;
use serde::{Deserialize, Serialize};

/// Which thread the subscriber wants callbacks on (carried, not enforced)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadMode {
    #[default]
    Handler,
    Post,
    Async,
    Background,
}

/// Everything a subscriber declares when registering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribeInfo {
    pub matching_skills: MatchingSkills,
    /// Publisher must hold this permission for the event to be delivered
    #[serde(default)]
    pub permission: String,
    #[serde(default)]
    pub device_id: String,
    /// Higher receives ordered events first
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "default_user")]
    pub user_id: i32,
    #[serde(default)]
    pub thread_mode: ThreadMode,
}

fn default_user() -> i32 {
    UNDEFINED_USER
}

impl SubscribeInfo {
    pub fn new(matching_skills: MatchingSkills) -> Self {
        Self {
            matching_skills,
            permission: String::new(),
            device_id: String::new(),
            priority: 0,
            user_id: UNDEFINED_USER,
            thread_mode: ThreadMode::default(),
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permission = permission.into();
        self
    }

    pub fn with_user(mut self, user_id: i32) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn with_device(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = device_id.into();
        self
    }

    pub fn events(&self) -> &[String] {
        self.matching_skills.events()
    }
}
