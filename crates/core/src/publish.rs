// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Publish-side options

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishInfo {
    #[serde(default)]
    pub ordered: bool,
    #[serde(default)]
    pub sticky: bool,
    /// Every subscriber must hold all of these to receive the event
    #[serde(default)]
    pub subscriber_permissions: Vec<String>,
    /// Restrict delivery to subscribers of this bundle
    #[serde(default)]
    pub bundle_name: String,
}

impl PublishInfo {
    pub fn unordered() -> Self {
        Self::default()
    }

    pub fn ordered() -> Self {
        Self {
            ordered: true,
            ..Self::default()
        }
    }

    pub fn sticky(mut self) -> Self {
        self.sticky = true;
        self
    }

    pub fn require_permission(mut self, permission: impl Into<String>) -> Self {
        self.subscriber_permissions.push(permission.into());
        self
    }

    pub fn for_bundle(mut self, bundle_name: impl Into<String>) -> Self {
        self.bundle_name = bundle_name.into();
        self
    }
}
