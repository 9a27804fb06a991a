use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{ArbitrationConfig, PRIMARY_PRIORITY};

/// Metadata shown when a player does not report a title or artist.
pub const UNKNOWN_METADATA: &str = "Unknown";

/// Stable identifier of one player instance
///
/// For MPRIS players this is the bus name without the
/// `org.mpris.MediaPlayer2.` prefix, e.g. `firefox.instance_1_84`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Create a PlayerId from an instance string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercase classification key used for priority lookup
    ///
    /// Everything before the first `.` of the identifier.
    pub fn name(&self) -> String {
        self.0
            .split('.')
            .next()
            .unwrap_or_default()
            .to_lowercase()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Current playback state of a media player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Player is currently playing
    Playing,

    /// Player is paused
    Paused,

    /// Player is stopped
    Stopped,
}

impl From<&str> for PlaybackState {
    fn from(status: &str) -> Self {
        match status {
            "Playing" => Self::Playing,
            "Paused" => Self::Paused,
            _ => Self::Stopped,
        }
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Playing => "Playing",
            Self::Paused => "Paused",
            Self::Stopped => "Stopped",
        };
        f.write_str(label)
    }
}

/// Raw observation of a player as returned by a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSnapshot {
    /// Player instance identifier
    pub id: PlayerId,
    /// Observed playback state
    pub status: PlaybackState,
    /// Track title
    pub title: String,
    /// Track artist(s)
    pub artist: String,
}

impl PlayerSnapshot {
    /// Snapshot with unknown metadata.
    pub fn new(id: impl Into<PlayerId>, status: PlaybackState) -> Self {
        Self {
            id: id.into(),
            status,
            title: UNKNOWN_METADATA.to_string(),
            artist: UNKNOWN_METADATA.to_string(),
        }
    }

    /// Sets the title and artist.
    pub fn with_track(mut self, title: impl Into<String>, artist: impl Into<String>) -> Self {
        self.title = title.into();
        self.artist = artist.into();
        self
    }
}

/// A player classified against the current configuration
///
/// Rebuilt from a [`PlayerSnapshot`] on every tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Player instance identifier
    pub id: PlayerId,
    /// Lowercase classification key
    pub name: String,
    /// Observed playback state
    pub status: PlaybackState,
    /// Track title
    pub title: String,
    /// Track artist(s)
    pub artist: String,
    /// Resolved priority, lower wins
    pub priority: u32,
    /// Whether the name matches a configured browser pattern
    pub is_browser: bool,
}

impl Player {
    /// Resolves name, priority and browser flag for a snapshot.
    pub fn from_snapshot(snapshot: PlayerSnapshot, config: &ArbitrationConfig) -> Self {
        let name = snapshot.id.name();
        let priority = config.priority_for(&name);
        let is_browser = config.is_browser(&name);

        Self {
            id: snapshot.id,
            name,
            status: snapshot.status,
            title: snapshot.title,
            artist: snapshot.artist,
            priority,
            is_browser,
        }
    }

    /// True for the priority-1 sources.
    pub fn is_primary_candidate(&self) -> bool {
        self.priority == PRIMARY_PRIORITY
    }

    /// Whether the player is currently audible.
    pub fn is_playing(&self) -> bool {
        self.status == PlaybackState::Playing
    }

    /// Player name with the first letter capitalized, for display.
    pub fn display_name(&self) -> String {
        display_name(&self.name)
    }
}

/// Capitalizes the first letter of a player name.
pub fn display_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
