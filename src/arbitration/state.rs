use std::collections::{HashMap, HashSet};

use super::{CommandKind, PlaybackState, Player, PlayerId};

/// Bookkeeping the engine carries from one tick to the next.
///
/// Owned exclusively by [`Engine`](super::Engine) and only mutated while a
/// tick runs. After every tick no id is in both `paused_by_engine` and
/// `manually_paused`.
#[derive(Debug, Default, Clone)]
pub struct ArbitrationState {
    pub(crate) last_status_by_id: HashMap<PlayerId, PlaybackState>,
    pub(crate) paused_by_engine: HashSet<PlayerId>,
    pub(crate) manually_paused: HashSet<PlayerId>,
    pub(crate) last_active_player: Option<PlayerId>,
    pub(crate) delivered: HashMap<PlayerId, CommandKind>,
    pub(crate) last_seen_tick: HashMap<PlayerId, u64>,
    pub(crate) tick_count: u64,
}

/// Status transition observed for one player between two ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Transition {
    /// Playing before, paused now, and the engine did not pause it
    ManualPause,
    /// Paused before, playing now
    Resumed,
    /// Anything else, including first observation
    Unchanged,
}

impl ArbitrationState {
    /// Status seen for `id` on the previous tick.
    pub fn last_status(&self, id: &PlayerId) -> Option<PlaybackState> {
        self.last_status_by_id.get(id).copied()
    }

    /// Players the engine paused itself.
    pub fn paused_by_engine(&self) -> &HashSet<PlayerId> {
        &self.paused_by_engine
    }

    /// Players believed paused by the user.
    pub fn manually_paused(&self) -> &HashSet<PlayerId> {
        &self.manually_paused
    }

    /// Most recent player reported as now playing.
    pub fn last_active_player(&self) -> Option<&PlayerId> {
        self.last_active_player.as_ref()
    }

    /// Number of completed ticks.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Compares each player against the previous tick and updates the pause
    /// sets, then replaces the status history with the current snapshot.
    pub(crate) fn classify_transitions(
        &mut self,
        players: &[Player],
    ) -> Vec<(PlayerId, Transition)> {
        let mut transitions = Vec::with_capacity(players.len());

        for player in players {
            let previous = self.last_status_by_id.get(&player.id).copied();
            let transition = match (previous, player.status) {
                (Some(PlaybackState::Playing), PlaybackState::Paused)
                    if !self.paused_by_engine.contains(&player.id) =>
                {
                    self.manually_paused.insert(player.id.clone());
                    Transition::ManualPause
                }
                (Some(PlaybackState::Paused), PlaybackState::Playing) => {
                    self.manually_paused.remove(&player.id);
                    self.paused_by_engine.remove(&player.id);
                    Transition::Resumed
                }
                _ => Transition::Unchanged,
            };
            transitions.push((player.id.clone(), transition));
        }

        let current: HashMap<PlayerId, PlaybackState> = players
            .iter()
            .map(|player| (player.id.clone(), player.status))
            .collect();

        // Suppression only holds across identical consecutive snapshots.
        if current != self.last_status_by_id {
            self.delivered.clear();
        }
        self.last_status_by_id = current;

        for player in players {
            self.last_seen_tick.insert(player.id.clone(), self.tick_count);
        }

        transitions
    }

    /// Whether `kind` already reached `id` and no player's status has changed
    /// since.
    pub(crate) fn already_delivered(&self, id: &PlayerId, kind: CommandKind) -> bool {
        self.delivered.get(id) == Some(&kind)
    }

    /// Folds a successful command into the pause sets.
    pub(crate) fn record_success(&mut self, id: &PlayerId, kind: CommandKind) {
        match kind {
            CommandKind::Pause => {
                self.manually_paused.remove(id);
                self.paused_by_engine.insert(id.clone());
            }
            CommandKind::Resume => {
                self.manually_paused.remove(id);
                self.paused_by_engine.remove(id);
            }
        }

        self.delivered.insert(id.clone(), kind);
    }

    /// Drops bookkeeping for players not enumerated during the last
    /// `window` ticks. Returns the evicted ids.
    pub(crate) fn evict_unseen(&mut self, window: u64) -> Vec<PlayerId> {
        let current = self.tick_count;
        let stale: Vec<PlayerId> = self
            .last_seen_tick
            .iter()
            .filter(|(_, seen)| current.saturating_sub(**seen) >= window)
            .map(|(id, _)| id.clone())
            .collect();

        for id in &stale {
            self.last_seen_tick.remove(id);
            self.paused_by_engine.remove(id);
            self.manually_paused.remove(id);
            self.delivered.remove(id);
        }

        stale
    }

    /// Sorted copy of a tracking set, for reporting.
    pub(crate) fn sorted(set: &HashSet<PlayerId>) -> Vec<PlayerId> {
        let mut ids: Vec<PlayerId> = set.iter().cloned().collect();
        ids.sort();
        ids
    }
}
