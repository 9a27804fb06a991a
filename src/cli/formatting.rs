//! Formatting utilities for CLI output.
//!
//! Player lines follow the layout `"▶ [P1] Firefox: title (auto-paused)"`.
//! Colors only wrap headers and errors so the lines stay easy to grep.

use crate::{
    arbitration::{PlaybackState, display_name},
    runtime_state::{PauseReason, PlayerStatus, RuntimeStatus},
};

/// Titles longer than this are cut and suffixed with "..."
pub const TITLE_WIDTH: usize = 40;

/// ANSI color codes for terminal output
pub struct Colors;

impl Colors {
    /// Reset all formatting
    pub const RESET: &'static str = "\x1b[0m";
    /// Bold text
    pub const BOLD: &'static str = "\x1b[1m";
    /// Dim text
    pub const DIM: &'static str = "\x1b[2m";

    /// Red color
    pub const RED: &'static str = "\x1b[31m";
    /// Green color
    pub const GREEN: &'static str = "\x1b[32m";
    /// Cyan color
    pub const CYAN: &'static str = "\x1b[36m";
}

/// Formats section headers with styling
pub fn format_header(text: &str) -> String {
    format!("{}{}{}{}", Colors::BOLD, Colors::CYAN, text, Colors::RESET)
}

/// Formats descriptions with muted styling
pub fn format_description(text: &str) -> String {
    format!("{}{}{}", Colors::DIM, text, Colors::RESET)
}

/// Formats success messages with green styling
pub fn format_success(text: &str) -> String {
    format!("{}{}{}{}", Colors::BOLD, Colors::GREEN, text, Colors::RESET)
}

/// Formats error messages with red styling
pub fn format_error(text: &str) -> String {
    format!("{}{}{}{}", Colors::BOLD, Colors::RED, text, Colors::RESET)
}

/// Icon for a playback state.
pub fn state_icon(status: PlaybackState) -> &'static str {
    match status {
        PlaybackState::Playing => "▶",
        PlaybackState::Paused => "⏸",
        PlaybackState::Stopped => "⏹",
    }
}

/// Cuts `title` to [`TITLE_WIDTH`] characters, appending "..." when cut.
pub fn truncate_title(title: &str) -> String {
    if title.chars().count() <= TITLE_WIDTH {
        return title.to_string();
    }

    let cut: String = title.chars().take(TITLE_WIDTH).collect();
    format!("{cut}...")
}

/// One player line.
pub fn format_player_line(
    status: PlaybackState,
    priority: u32,
    name: &str,
    title: &str,
    pause_reason: Option<PauseReason>,
) -> String {
    let suffix = match pause_reason {
        Some(PauseReason::Auto) => " (auto-paused)",
        Some(PauseReason::Manual) => " (manually paused)",
        None => "",
    };

    format!(
        "{} [P{priority}] {}: {}{suffix}",
        state_icon(status),
        display_name(name),
        truncate_title(title)
    )
}

fn format_player_status(player: &PlayerStatus) -> String {
    format_player_line(
        player.status,
        player.priority,
        &player.name,
        &player.title,
        player.pause_reason,
    )
}

/// Full `mediasense status` report.
pub fn format_status(status: &RuntimeStatus) -> String {
    let detector = if status.running { "ON" } else { "OFF" };
    let mut output = format!("{}\n", format_header(&format!("Detector: {detector}")));

    if status.pause_all {
        output.push_str("Pause all: enabled\n");
    }

    let last_active = status
        .last_active_player
        .as_ref()
        .map_or_else(|| "none".to_string(), ToString::to_string);
    output.push_str(&format!("Last active player: {last_active}\n"));

    if status.players.is_empty() {
        output.push_str("No media players found\n");
    } else {
        output.push('\n');
        for player in &status.players {
            output.push_str(&format_player_status(player));
            output.push('\n');
        }
    }

    output.push_str(&format_description(&format!(
        "\nUpdated {}",
        status.updated_at.format("%Y-%m-%d %H:%M:%S")
    )));
    output
}
