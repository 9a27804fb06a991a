//! Unit tests for CLI module
//!
//! Tests argument parsing, formatting and the commands that need no bus.

#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;

use chrono::Local;
use clap::Parser;

use crate::arbitration::{PlaybackState, PlayerId};
use crate::cli::formatting::{format_player_line, format_status, truncate_title};
use crate::cli::{Cli, CliCommand, CliError, Command, ConfigCommand, StatusCommand};
use crate::config::Config;
use crate::runtime_state::{PauseReason, PlayerStatus, RuntimeStatus};

#[test]
fn run_is_the_default_command() {
    let cli = Cli::try_parse_from(["mediasense"]).unwrap();

    assert_eq!(cli.command(), CliCommand::Run);
    assert!(cli.config.is_none());
}

#[test]
fn config_path_is_global() {
    let cli = Cli::try_parse_from(["mediasense", "status", "--config", "/tmp/ms.toml"]).unwrap();

    assert_eq!(cli.command(), CliCommand::Status);
    assert_eq!(cli.config, Some(PathBuf::from("/tmp/ms.toml")));
}

#[test]
fn unknown_subcommand_is_rejected() {
    assert!(Cli::try_parse_from(["mediasense", "stop"]).is_err());
}

#[test]
fn short_titles_are_kept() {
    assert_eq!(truncate_title("Short title"), "Short title");
    assert_eq!(truncate_title(&"x".repeat(40)), "x".repeat(40));
}

#[test]
fn long_titles_are_cut_at_forty_chars() {
    let title = "é".repeat(45);

    assert_eq!(truncate_title(&title), format!("{}...", "é".repeat(40)));
}

#[test]
fn player_line_layout() {
    assert_eq!(
        format_player_line(PlaybackState::Playing, 1, "firefox", "Lecture", None),
        "▶ [P1] Firefox: Lecture"
    );
    assert_eq!(
        format_player_line(PlaybackState::Paused, 2, "spotify", "Song", Some(PauseReason::Auto)),
        "⏸ [P2] Spotify: Song (auto-paused)"
    );
    assert_eq!(
        format_player_line(PlaybackState::Stopped, 10, "mpv", "Clip", Some(PauseReason::Manual)),
        "⏹ [P10] Mpv: Clip (manually paused)"
    );
}

fn runtime_status(running: bool) -> RuntimeStatus {
    RuntimeStatus {
        running,
        pause_all: false,
        tick: 3,
        last_active_player: Some(PlayerId::new("firefox.1")),
        players: vec![PlayerStatus {
            id: PlayerId::new("spotify.1"),
            name: "spotify".to_string(),
            status: PlaybackState::Paused,
            title: "Song".to_string(),
            artist: "Artist".to_string(),
            priority: 2,
            pause_reason: Some(PauseReason::Auto),
        }],
        updated_at: Local::now(),
    }
}

#[test]
fn status_report_lists_players() {
    let report = format_status(&runtime_status(true));

    assert!(report.contains("Detector: ON"));
    assert!(report.contains("Last active player: firefox.1"));
    assert!(report.contains("⏸ [P2] Spotify: Song (auto-paused)"));
}

#[test]
fn stopped_service_reports_off() {
    assert!(format_status(&runtime_status(false)).contains("Detector: OFF"));
}

#[tokio::test]
async fn status_command_without_file() {
    let temp = tempfile::TempDir::new().unwrap();
    let command = StatusCommand::new(temp.path().join("status.json"));

    let output = command.execute().await.unwrap();

    assert!(output.contains("no status file"));
}

#[tokio::test]
async fn status_command_reads_file() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = temp.path().join("status.json");
    runtime_status(true).save(&path).unwrap();

    let output = StatusCommand::new(path).execute().await.unwrap();

    assert!(output.contains("Spotify"));
}

#[tokio::test]
async fn status_command_reports_corrupt_file() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = temp.path().join("status.json");
    std::fs::write(&path, "[]").unwrap();

    let result = StatusCommand::new(path).execute().await;

    assert!(matches!(result, Err(CliError::StatusError(_))));
}

#[tokio::test]
async fn config_command_prints_toml() {
    let output = ConfigCommand::new(Config::default()).execute().await.unwrap();

    assert!(output.contains("[arbitration]"));
    assert!(output.contains("poll_interval_ms = 1000"));
    assert_eq!(Config::from_toml_str(&output).unwrap(), Config::default());
}

#[tokio::test]
async fn config_command_prints_schema() {
    let output = ConfigCommand::new(Config::default())
        .with_schema(true)
        .execute()
        .await
        .unwrap();

    let schema: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert!(schema["properties"]["arbitration"].is_object());
}

#[test]
fn config_schema_flag_parses() {
    let cli = Cli::try_parse_from(["mediasense", "config", "--schema"]).unwrap();

    assert_eq!(cli.command(), CliCommand::Config { schema: true });
}
