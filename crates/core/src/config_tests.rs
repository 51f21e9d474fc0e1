// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io::Write;

#[test]
fn empty_document_uses_defaults() {
    let config = BrokerConfig::from_toml_str("").unwrap();
    assert_eq!(config, BrokerConfig::default());
    assert_eq!(config.receiver_timeout, Duration::from_secs(10));
    assert_eq!(config.history_capacity, 100);
    assert_eq!(config.subscriber_warn_threshold, 255);
    assert_eq!(config.max_events_per_subscription, 512);
}

#[test]
fn humantime_durations_parse() {
    let config = BrokerConfig::from_toml_str(
        r#"
receiver_timeout = "250ms"
freeze_retention = "1m"
history_capacity = 5
"#,
    )
    .unwrap();
    assert_eq!(config.receiver_timeout, Duration::from_millis(250));
    assert_eq!(config.freeze_retention, Duration::from_secs(60));
    assert_eq!(config.history_capacity, 5);
    assert_eq!(config.publish_report_interval, Duration::from_secs(10));
}

#[test]
fn bad_duration_is_a_parse_error() {
    let err = BrokerConfig::from_toml_str(r#"receiver_timeout = "soon""#).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn load_reads_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "subscriber_warn_threshold = 3").unwrap();
    let config = BrokerConfig::load(file.path()).unwrap();
    assert_eq!(config.subscriber_warn_threshold, 3);
}

#[test]
fn load_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = BrokerConfig::load(&dir.path().join("missing.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn builders_override_fields() {
    let config = BrokerConfig::for_testing()
        .with_receiver_timeout(Duration::from_secs(1))
        .with_history_capacity(3)
        .with_subscriber_warn_threshold(1);
    assert_eq!(config.receiver_timeout, Duration::from_secs(1));
    assert_eq!(config.history_capacity, 3);
    assert_eq!(config.subscriber_warn_threshold, 1);
}
