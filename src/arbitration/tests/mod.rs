//! Unit tests for the arbitration module
//! Engine decisions are checked against the in-memory provider; driver tests
//! run on a paused Tokio clock.

#![allow(clippy::panic)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod driver;

use crate::config::ArbitrationConfig;

use super::{PlaybackState, Player, PlayerSnapshot};

pub(super) use PlaybackState::{Paused, Playing, Stopped};

/// Snapshots in the given order, metadata unknown.
pub(super) fn snapshots(players: &[(&str, PlaybackState)]) -> Vec<PlayerSnapshot> {
    players
        .iter()
        .map(|(id, status)| PlayerSnapshot::new(*id, *status))
        .collect()
}

/// Classified players against `config`.
pub(super) fn classify(snapshots: &[PlayerSnapshot], config: &ArbitrationConfig) -> Vec<Player> {
    snapshots
        .iter()
        .cloned()
        .map(|snapshot| Player::from_snapshot(snapshot, config))
        .collect()
}
