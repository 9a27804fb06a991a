use std::time::Duration;

use thiserror::Error;

use super::PlayerId;

/// Failure to list players for a tick.
///
/// The tick is skipped and arbitration state is left untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// The media-control surface could not be reached
    #[error("player enumeration unavailable: {0}")]
    Unavailable(String),

    /// Enumeration did not finish within its time budget
    #[error("player enumeration timed out after {0:?}")]
    Timeout(Duration),

    /// The bus reported an error while listing players
    #[error("bus error during enumeration: {0}")]
    Bus(String),
}

/// Failure of a single pause or resume command.
///
/// Other commands of the same tick still run; the target's bookkeeping is
/// not updated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    /// The player rejected or failed the call
    #[error("command to {player} failed: {details}")]
    Failed {
        /// Target player
        player: PlayerId,
        /// Error details
        details: String,
    },

    /// The call did not complete within its time budget
    #[error("command to {player} timed out after {after:?}")]
    Timeout {
        /// Target player
        player: PlayerId,
        /// Time budget that was exceeded
        after: Duration,
    },

    /// The player vanished before the command reached it
    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),
}
