//! Unit tests for config module
//!
//! Tests configuration types, defaults, validation and serialization.
//! Filesystem access is limited to temporary directories.

#![allow(clippy::panic)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use crate::config::{ArbitrationConfig, Config, ConfigError, DEFAULT_PRIORITY, LogLevel};

#[test]
fn config_default_matches_shipped_priorities() {
    let config = Config::default();

    assert_eq!(config.general.log_level, LogLevel::Info);
    assert_eq!(config.arbitration.priority_for("firefox"), 1);
    assert_eq!(config.arbitration.priority_for("chrome"), 1);
    assert_eq!(config.arbitration.priority_for("spotify"), 2);
    assert_eq!(config.arbitration.priority_for("audacious"), 5);
    assert!(config.arbitration.notifications_enabled);
    assert!(!config.arbitration.pause_all_enabled);
    assert!(config.validate().is_ok());
}

#[test]
fn log_level_directives_quiet_the_bus_below_trace() {
    assert_eq!(LogLevel::Info.directive(), "info,zbus=warn");
    assert_eq!(LogLevel::Debug.directive(), "debug,zbus=warn");
    assert_eq!(LogLevel::Trace.directive(), "trace");
    assert_eq!(LogLevel::Warn.to_string(), "warn");
}

#[test]
fn unconfigured_players_get_default_priority() {
    let config = ArbitrationConfig::default();

    assert_eq!(config.priority_for("mpv"), DEFAULT_PRIORITY);
}

#[test]
fn browser_patterns_match_by_substring() {
    let config = ArbitrationConfig::default();

    assert!(config.is_browser("firefox"));
    assert!(config.is_browser("brave-browser"));
    assert!(!config.is_browser("spotify"));
}

#[test]
fn ignored_players_match_bus_name_substrings() {
    let config = ArbitrationConfig {
        ignored_players: vec!["kdeconnect".to_string()],
        ..Default::default()
    };

    assert!(config.is_ignored("org.mpris.MediaPlayer2.kdeconnect.mpris_000001"));
    assert!(!config.is_ignored("org.mpris.MediaPlayer2.spotify"));
}

#[test]
fn config_empty_toml_uses_defaults() {
    let config = Config::from_toml_str("").unwrap();

    assert_eq!(config, Config::default());
}

#[test]
fn partial_toml_keeps_other_defaults() {
    let config = Config::from_toml_str(
        r#"
        [general]
        log_level = "debug"

        [arbitration]
        pause_all_enabled = true
        poll_interval_ms = 250

        [arbitration.priorities]
        mpv = 1
    "#,
    )
    .unwrap();

    assert_eq!(config.general.log_level, LogLevel::Debug);
    assert!(config.arbitration.pause_all_enabled);
    assert_eq!(config.arbitration.poll_interval_ms, 250);
    assert_eq!(config.arbitration.priority_for("mpv"), 1);
    assert_eq!(config.arbitration.priority_for("firefox"), DEFAULT_PRIORITY);
    assert_eq!(config.arbitration.command_timeout_ms, 2000);
}

#[test]
fn config_serialize_roundtrip() {
    let original = Config::default();

    let toml_str = original.to_toml_string().unwrap();
    assert!(toml_str.contains("[general]"));
    assert!(toml_str.contains("[arbitration]"));
    assert!(!toml_str.contains("evict_after_ticks"));

    let deserialized = Config::from_toml_str(&toml_str).unwrap();
    assert_eq!(original, deserialized);
}

#[test]
fn zero_priority_is_rejected() {
    let result = Config::from_toml_str(
        r#"
        [arbitration.priorities]
        vlc = 0
    "#,
    );

    match result {
        Err(ConfigError::Validation { field, .. }) => {
            assert_eq!(field, "arbitration.priorities.vlc");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn uppercase_priority_names_are_rejected() {
    let mut config = ArbitrationConfig::default();
    config.priorities.insert("Spotify".to_string(), 2);

    assert!(matches!(
        config.validate(),
        Err(ConfigError::Validation { .. })
    ));
}

#[test]
fn zero_durations_are_rejected() {
    for field in ["poll_interval_ms", "command_timeout_ms", "enumerate_timeout_ms"] {
        let toml_str = format!("[arbitration]\n{field} = 0\n");
        let result = Config::from_toml_str(&toml_str);

        assert!(
            matches!(result, Err(ConfigError::Validation { .. })),
            "{field} = 0 should be rejected"
        );
    }
}

#[test]
fn backoff_ceiling_must_cover_poll_interval() {
    let config = ArbitrationConfig {
        poll_interval_ms: 5000,
        max_backoff_ms: 1000,
        ..Default::default()
    };

    assert!(config.validate().is_err());
}

#[test]
fn eviction_window_of_zero_is_rejected() {
    let config = ArbitrationConfig {
        evict_after_ticks: Some(0),
        ..Default::default()
    };

    assert!(config.validate().is_err());
}

#[test]
fn malformed_toml_reports_parse_error() {
    let result = Config::from_toml_str("[arbitration\npause_all_enabled = ");

    match result {
        Err(ConfigError::Parse { location, .. }) => assert_eq!(location, "string"),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn load_or_create_writes_defaults() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = temp.path().join("nested/config.toml");

    let config = Config::load_or_create(&path).unwrap();

    assert!(path.exists());
    assert_eq!(config, Config::default());

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("# MediaSense configuration file"));
}
