//! Playback arbitration.
//!
//! The [`Engine`] turns a player snapshot into pause/resume commands so that
//! at most one priority-1 source and one secondary source play at once, while
//! remembering which pauses it caused and which ones the user made. The
//! [`PollDriver`] feeds it snapshots from a [`PlayerProvider`] on a fixed
//! cadence and publishes every [`EngineResult`] to an [`EventSink`].

mod command;
mod driver;
mod engine;
mod error;
mod events;
mod memory;
mod player;
mod provider;
mod state;

#[cfg(test)]
mod tests;

pub use command::{Command, CommandKind, CommandReport};
pub use driver::{PollDriver, TickOutcome, backoff_delay};
pub use engine::Engine;
pub use error::{CommandError, ProviderError};
pub use events::{
    ChannelSink, EngineEvent, EngineResult, EventSink, FanoutSink, NowPlaying, TracingSink,
};
pub use memory::MemoryProvider;
pub use player::{
    PlaybackState, Player, PlayerId, PlayerSnapshot, UNKNOWN_METADATA, display_name,
};
pub use provider::{PlayerController, PlayerProvider};
pub use state::ArbitrationState;
