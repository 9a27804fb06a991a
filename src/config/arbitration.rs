use std::{collections::BTreeMap, time::Duration};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Priority assigned to players whose name has no entry in `priorities`.
pub const DEFAULT_PRIORITY: u32 = 10;

/// Priority value that marks a player as the primary source.
pub const PRIMARY_PRIORITY: u32 = 1;

/// Playback arbitration settings.
///
/// A value of this type is the snapshot the engine reads at the start of every
/// tick. It is never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ArbitrationConfig {
    /// Player name to priority. 1 is the primary source, larger is lower.
    pub priorities: BTreeMap<String, u32>,

    /// Priority used for player names missing from `priorities`.
    pub default_priority: u32,

    /// Pause every playing player, primary included. Nothing is resumed.
    pub pause_all_enabled: bool,

    /// Whether now-playing events should surface as user notifications.
    pub notifications_enabled: bool,

    /// Milliseconds between two polls of the player list.
    pub poll_interval_ms: u64,

    /// Substrings of player names that mark them as browsers.
    pub browser_patterns: Vec<String>,

    /// Bus name substrings of players that are never enumerated.
    pub ignored_players: Vec<String>,

    /// Upper bound in milliseconds for a single pause or resume call.
    pub command_timeout_ms: u64,

    /// Upper bound in milliseconds for listing all players.
    pub enumerate_timeout_ms: u64,

    /// Multiple of the poll interval to wait after a failed enumeration.
    pub error_backoff_factor: u32,

    /// Ceiling in milliseconds for the widening failure backoff.
    pub max_backoff_ms: u64,

    /// Forget pause bookkeeping for players unseen for this many ticks.
    /// Unset keeps entries for the lifetime of the process.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evict_after_ticks: Option<u64>,
}

impl Default for ArbitrationConfig {
    fn default() -> Self {
        let priorities = [
            ("firefox", 1),
            ("chromium", 1),
            ("chrome", 1),
            ("spotify", 2),
            ("vlc", 3),
            ("rhythmbox", 4),
            ("audacious", 5),
        ]
        .into_iter()
        .map(|(name, priority)| (name.to_string(), priority))
        .collect();

        Self {
            priorities,
            default_priority: DEFAULT_PRIORITY,
            pause_all_enabled: false,
            notifications_enabled: true,
            poll_interval_ms: 1000,
            browser_patterns: ["firefox", "chromium", "chrome", "brave"]
                .into_iter()
                .map(String::from)
                .collect(),
            ignored_players: Vec::new(),
            command_timeout_ms: 2000,
            enumerate_timeout_ms: 5000,
            error_backoff_factor: 5,
            max_backoff_ms: 60_000,
            evict_after_ticks: None,
        }
    }
}

impl ArbitrationConfig {
    /// Resolves the priority of a player by its lowercase name.
    pub fn priority_for(&self, name: &str) -> u32 {
        self.priorities
            .get(name)
            .copied()
            .unwrap_or(self.default_priority)
    }

    /// Whether `name` matches one of the configured browser patterns.
    pub fn is_browser(&self, name: &str) -> bool {
        self.browser_patterns
            .iter()
            .any(|pattern| name.contains(pattern.as_str()))
    }

    /// Whether the player on `bus_name` should be skipped during enumeration.
    pub fn is_ignored(&self, bus_name: &str) -> bool {
        self.ignored_players
            .iter()
            .any(|pattern| bus_name.contains(pattern.as_str()))
    }

    /// Normal delay between two ticks.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Time budget for one pause or resume call.
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    /// Time budget for one enumeration.
    pub fn enumerate_timeout(&self) -> Duration {
        Duration::from_millis(self.enumerate_timeout_ms)
    }

    /// Longest delay the failure backoff may reach.
    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }

    /// Checks every field the engine and poll driver rely on.
    ///
    /// # Errors
    /// Returns `ConfigError::Validation` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some((name, _)) = self.priorities.iter().find(|(_, priority)| **priority == 0) {
            return Err(ConfigError::validation(
                &format!("arbitration.priorities.{name}"),
                "priorities start at 1",
            ));
        }

        if self.priorities.keys().any(|name| *name != name.to_lowercase()) {
            return Err(ConfigError::validation(
                "arbitration.priorities",
                "player names must be lowercase",
            ));
        }

        if self.default_priority == 0 {
            return Err(ConfigError::validation(
                "arbitration.default_priority",
                "priorities start at 1",
            ));
        }

        for (field, value) in [
            ("poll_interval_ms", self.poll_interval_ms),
            ("command_timeout_ms", self.command_timeout_ms),
            ("enumerate_timeout_ms", self.enumerate_timeout_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::validation(
                    &format!("arbitration.{field}"),
                    "must be greater than zero",
                ));
            }
        }

        if self.error_backoff_factor == 0 {
            return Err(ConfigError::validation(
                "arbitration.error_backoff_factor",
                "must be at least 1",
            ));
        }

        if self.max_backoff_ms < self.poll_interval_ms {
            return Err(ConfigError::validation(
                "arbitration.max_backoff_ms",
                "must not be shorter than poll_interval_ms",
            ));
        }

        if self.evict_after_ticks == Some(0) {
            return Err(ConfigError::validation(
                "arbitration.evict_after_ticks",
                "must be at least 1 when set",
            ));
        }

        Ok(())
    }
}
