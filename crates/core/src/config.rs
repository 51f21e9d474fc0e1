// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Broker tuning knobs
//!
//! Loaded from TOML; every field has a default so an empty document is a
//! valid configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// How long one ordered receiver may hold an event
    #[serde(with = "humantime_serde")]
    pub receiver_timeout: Duration,
    /// Frozen events older than this are dropped when a new one is buffered
    #[serde(with = "humantime_serde")]
    pub freeze_retention: Duration,
    pub history_capacity: usize,
    /// Subscriber count per event above which a capacity warning is raised
    pub subscriber_warn_threshold: usize,
    pub max_events_per_subscription: usize,
    /// Minimum spacing between publish telemetry reports
    #[serde(with = "humantime_serde")]
    pub publish_report_interval: Duration,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            receiver_timeout: Duration::from_secs(10),
            freeze_retention: Duration::from_secs(30),
            history_capacity: 100,
            subscriber_warn_threshold: 255,
            max_events_per_subscription: 512,
            publish_report_interval: Duration::from_secs(10),
        }
    }
}

impl BrokerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Short timeouts and small capacities for tests
    pub fn for_testing() -> Self {
        Self {
            receiver_timeout: Duration::from_millis(100),
            freeze_retention: Duration::from_secs(30),
            history_capacity: 10,
            subscriber_warn_threshold: 4,
            max_events_per_subscription: 8,
            publish_report_interval: Duration::from_secs(10),
        }
    }

    pub fn with_receiver_timeout(mut self, timeout: Duration) -> Self {
        self.receiver_timeout = timeout;
        self
    }

    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    pub fn with_subscriber_warn_threshold(mut self, threshold: usize) -> Self {
        self.subscriber_warn_threshold = threshold;
        self
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
