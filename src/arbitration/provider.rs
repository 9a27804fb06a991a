use async_trait::async_trait;

use super::{CommandError, PlayerId, PlayerSnapshot, ProviderError};

/// Issues playback commands to individual players.
///
/// Both calls are idempotent and best effort: pausing a paused player is not
/// an error.
#[async_trait]
pub trait PlayerController: Send + Sync {
    /// Pause the player.
    ///
    /// # Errors
    /// Returns `CommandError` if the player could not be reached or refused.
    async fn pause(&self, id: &PlayerId) -> Result<(), CommandError>;

    /// Resume the player.
    ///
    /// # Errors
    /// Returns `CommandError` if the player could not be reached or refused.
    async fn resume(&self, id: &PlayerId) -> Result<(), CommandError>;
}

/// Supplies the player list for each tick and accepts commands.
///
/// The order of the returned snapshots is part of the contract: every
/// "first player" tie-break in the engine follows it, so implementations
/// must list players in a stable order.
#[async_trait]
pub trait PlayerProvider: PlayerController {
    /// List the players currently exposed by the host.
    ///
    /// # Errors
    /// Returns `ProviderError` when the list cannot be produced.
    async fn enumerate(&self) -> Result<Vec<PlayerSnapshot>, ProviderError>;
}
