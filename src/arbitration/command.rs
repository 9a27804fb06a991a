use std::fmt;

use serde::{Deserialize, Serialize};

use super::{CommandError, PlayerId};

/// What a command asks a player to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    /// Pause playback
    Pause,
    /// Resume playback
    Resume,
}

/// A pause or resume decision targeting one player
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Command {
    /// Requested action
    pub kind: CommandKind,
    /// Target player
    pub target: PlayerId,
}

impl Command {
    /// Pause `target`.
    pub fn pause(target: PlayerId) -> Self {
        Self {
            kind: CommandKind::Pause,
            target,
        }
    }

    /// Resume `target`.
    pub fn resume(target: PlayerId) -> Self {
        Self {
            kind: CommandKind::Resume,
            target,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            CommandKind::Pause => write!(f, "pause({})", self.target),
            CommandKind::Resume => write!(f, "resume({})", self.target),
        }
    }
}

/// A command together with its delivery result
#[derive(Debug, Clone, PartialEq)]
pub struct CommandReport {
    /// The issued command
    pub command: Command,
    /// Delivery result reported by the controller
    pub outcome: Result<(), CommandError>,
}

impl CommandReport {
    /// Whether the controller reported success.
    pub fn succeeded(&self) -> bool {
        self.outcome.is_ok()
    }
}
