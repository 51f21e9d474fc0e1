// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event payload: the `Want` describing the event and the mutable result

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Describes what happened: action name plus optional routing attributes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Want {
    /// Event name, e.g. `usual.event.BOOT_COMPLETED`
    pub action: String,
    #[serde(default)]
    pub entities: Vec<String>,
    #[serde(default)]
    pub scheme: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub flags: u32,
    /// Target bundle carried inside the want (informational)
    #[serde(default)]
    pub bundle: String,
    #[serde(default)]
    pub ability: String,
    #[serde(default)]
    pub device_id: String,
    /// Free-form extras
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

impl Want {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            ..Self::default()
        }
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entities.push(entity.into());
        self
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }
}

/// One event as seen by listeners: the want plus a result code and data
/// that ordered receivers may rewrite along the chain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommonEventData {
    pub want: Want,
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub data: String,
}

impl CommonEventData {
    pub fn new(want: Want) -> Self {
        Self {
            want,
            code: 0,
            data: String::new(),
        }
    }

    pub fn with_result(mut self, code: i32, data: impl Into<String>) -> Self {
        self.code = code;
        self.data = data.into();
        self
    }

    pub fn action(&self) -> &str {
        &self.want.action
    }
}
