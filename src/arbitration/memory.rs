use std::{
    collections::HashSet,
    sync::{Mutex, MutexGuard, PoisonError},
};

use async_trait::async_trait;

use super::{
    Command, CommandError, PlaybackState, PlayerController, PlayerId, PlayerProvider,
    PlayerSnapshot, ProviderError,
};

#[derive(Debug, Default)]
struct Inner {
    players: Vec<PlayerSnapshot>,
    pending_enumeration_failures: u32,
    stall_enumeration: bool,
    failing_players: HashSet<PlayerId>,
    stalling_players: HashSet<PlayerId>,
    issued: Vec<Command>,
    enumerations: u32,
}

/// In-memory player provider.
///
/// Holds a fixed, ordered list of simulated players that obey pause and
/// resume commands. Failures and stalls can be injected per player or for
/// enumeration, which makes it the provider of choice for driving the engine
/// without a session bus.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    inner: Mutex<Inner>,
}

impl MemoryProvider {
    /// Provider listing `players` in the given order.
    pub fn new(players: Vec<PlayerSnapshot>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                players,
                ..Default::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the whole player list.
    pub fn set_players(&self, players: Vec<PlayerSnapshot>) {
        self.lock().players = players;
    }

    /// Changes one player's status, as if the user acted on it.
    pub fn set_status(&self, id: &PlayerId, status: PlaybackState) {
        if let Some(player) = self.lock().players.iter_mut().find(|p| &p.id == id) {
            player.status = status;
        }
    }

    /// Status of one player, if present.
    pub fn status(&self, id: &PlayerId) -> Option<PlaybackState> {
        self.lock()
            .players
            .iter()
            .find(|p| &p.id == id)
            .map(|p| p.status)
    }

    /// Current player list.
    pub fn players(&self) -> Vec<PlayerSnapshot> {
        self.lock().players.clone()
    }

    /// The next `count` enumerations fail.
    pub fn fail_next_enumerations(&self, count: u32) {
        self.lock().pending_enumeration_failures = count;
    }

    /// Enumeration never completes while set.
    pub fn stall_enumeration(&self, stall: bool) {
        self.lock().stall_enumeration = stall;
    }

    /// Commands to `id` fail until cleared.
    pub fn fail_commands_for(&self, id: &PlayerId, fail: bool) {
        let mut inner = self.lock();
        if fail {
            inner.failing_players.insert(id.clone());
        } else {
            inner.failing_players.remove(id);
        }
    }

    /// Commands to `id` never complete.
    pub fn stall_commands_for(&self, id: &PlayerId) {
        self.lock().stalling_players.insert(id.clone());
    }

    /// Every command received so far, in arrival order.
    pub fn issued(&self) -> Vec<Command> {
        self.lock().issued.clone()
    }

    /// Returns and clears the received commands.
    pub fn take_issued(&self) -> Vec<Command> {
        std::mem::take(&mut self.lock().issued)
    }

    /// Number of enumeration attempts, failed ones included.
    pub fn enumerations(&self) -> u32 {
        self.lock().enumerations
    }

    async fn apply(
        &self,
        command: Command,
        from: PlaybackState,
        to: PlaybackState,
    ) -> Result<(), CommandError> {
        let stall = {
            let mut inner = self.lock();
            inner.issued.push(command.clone());

            if inner.failing_players.contains(&command.target) {
                return Err(CommandError::Failed {
                    player: command.target,
                    details: "injected failure".to_string(),
                });
            }

            inner.stalling_players.contains(&command.target)
        };

        if stall {
            futures::future::pending::<()>().await;
        }

        let mut inner = self.lock();
        let player = inner
            .players
            .iter_mut()
            .find(|p| p.id == command.target)
            .ok_or_else(|| CommandError::PlayerNotFound(command.target.clone()))?;

        if player.status == from {
            player.status = to;
        }
        Ok(())
    }
}

#[async_trait]
impl PlayerController for MemoryProvider {
    async fn pause(&self, id: &PlayerId) -> Result<(), CommandError> {
        self.apply(Command::pause(id.clone()), PlaybackState::Playing, PlaybackState::Paused)
            .await
    }

    async fn resume(&self, id: &PlayerId) -> Result<(), CommandError> {
        self.apply(Command::resume(id.clone()), PlaybackState::Paused, PlaybackState::Playing)
            .await
    }
}

#[async_trait]
impl PlayerProvider for MemoryProvider {
    async fn enumerate(&self) -> Result<Vec<PlayerSnapshot>, ProviderError> {
        let stall = {
            let mut inner = self.lock();
            inner.enumerations += 1;

            if inner.pending_enumeration_failures > 0 {
                inner.pending_enumeration_failures -= 1;
                return Err(ProviderError::Unavailable("injected failure".to_string()));
            }

            inner.stall_enumeration
        };

        if stall {
            futures::future::pending::<()>().await;
        }

        Ok(self.players())
    }
}
