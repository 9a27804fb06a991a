//! Unit tests for config_store module
//! No timing or external dependencies; files live in temporary directories.

#![allow(clippy::panic)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::fs;

use crate::config::{ArbitrationConfig, ConfigError, LogLevel};
use crate::config_store::{ChangeSource, ConfigChange, ConfigSource, ConfigStore};

#[test]
fn config_change_new() {
    let change = ConfigChange::new(ChangeSource::FileEdit, false, true);

    assert_eq!(change.source, ChangeSource::FileEdit);
    assert!(!change.general_changed);
    assert!(change.arbitration_changed);
    assert!(change.timestamp.elapsed().as_secs() < 1);
}

#[test]
fn default_store_serves_default_snapshot() {
    let store = ConfigStore::with_defaults();

    assert_eq!(store.current(), ArbitrationConfig::default());
    assert!(store.path().is_none());
}

#[test]
fn plain_config_is_its_own_source() {
    let config = ArbitrationConfig {
        pause_all_enabled: true,
        ..Default::default()
    };

    assert!(config.current().pause_all_enabled);
}

#[test]
fn update_arbitration_broadcasts_change() {
    let store = ConfigStore::with_defaults();
    let mut rx = store.subscribe();

    store
        .update_arbitration(|config| config.pause_all_enabled = true)
        .unwrap();

    assert!(store.current().pause_all_enabled);

    let change = rx.try_recv().unwrap();
    assert_eq!(change.source, ChangeSource::Programmatic);
    assert!(change.arbitration_changed);
    assert!(!change.general_changed);
}

#[test]
fn noop_update_is_not_broadcast() {
    let store = ConfigStore::with_defaults();
    let mut rx = store.subscribe();

    store
        .update_arbitration(|config| config.pause_all_enabled = false)
        .unwrap();

    assert!(rx.try_recv().is_err());
}

#[test]
fn invalid_update_keeps_previous_settings() {
    let store = ConfigStore::with_defaults();

    let result = store.update_arbitration(|config| config.poll_interval_ms = 0);

    assert!(matches!(result, Err(ConfigError::Validation { .. })));
    assert_eq!(store.current().poll_interval_ms, 1000);
}

#[test]
fn reload_picks_up_file_edits() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    let store = ConfigStore::load_from(&path).unwrap();
    let mut rx = store.subscribe();

    fs::write(
        &path,
        "[general]\nlog_level = \"trace\"\n\n[arbitration]\nnotifications_enabled = false\n",
    )
    .unwrap();

    assert!(store.reload().unwrap());
    assert!(!store.current().notifications_enabled);
    assert_eq!(store.get_current().general.log_level, LogLevel::Trace);

    let change = rx.try_recv().unwrap();
    assert_eq!(change.source, ChangeSource::FileEdit);
    assert!(change.general_changed);
    assert!(change.arbitration_changed);

    assert!(!store.reload().unwrap());
}

#[test]
fn broken_file_keeps_previous_configuration() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    let store = ConfigStore::load_from(&path).unwrap();

    fs::write(&path, "[arbitration]\npoll_interval_ms = \"fast\"\n").unwrap();

    assert!(matches!(store.reload(), Err(ConfigError::Parse { .. })));
    assert_eq!(store.current(), ArbitrationConfig::default());
}

#[test]
fn reload_without_file_is_noop() {
    let store = ConfigStore::with_defaults();

    assert!(!store.reload().unwrap());
}
