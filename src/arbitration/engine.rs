use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, info, instrument, warn};

use crate::config::ArbitrationConfig;

use super::{
    ArbitrationState, Command, CommandError, CommandKind, CommandReport, EngineResult, NowPlaying,
    PlaybackState, Player, PlayerController, state::Transition,
};

/// Decisions of one tick, before any command was delivered
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TickPlan {
    pub(crate) commands: Vec<Command>,
    /// Commands withheld because the snapshot did not change since they
    /// were delivered
    pub(crate) suppressed: Vec<Command>,
    pub(crate) now_playing: Option<NowPlaying>,
    pub(crate) pause_all: bool,
}

/// Playback arbitration engine.
///
/// Holds [`ArbitrationState`] across ticks and decides, for each player
/// snapshot, which players to pause or resume so that at most one priority-1
/// source and one secondary source are audible.
#[derive(Debug, Default)]
pub struct Engine {
    state: ArbitrationState,
}

impl Engine {
    /// Engine with empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine resuming from previously captured state.
    pub fn with_state(state: ArbitrationState) -> Self {
        Self { state }
    }

    /// Current bookkeeping.
    pub fn state(&self) -> &ArbitrationState {
        &self.state
    }

    /// Runs one full tick: classifies transitions, decides commands, delivers
    /// them through `controller` and folds the results back into the state.
    ///
    /// Commands go out concurrently, each bounded by the configured command
    /// timeout. A failed or timed-out command leaves its target's bookkeeping
    /// untouched and does not stop the others.
    #[instrument(skip_all, fields(tick = self.state.tick_count + 1, players = players.len()))]
    pub async fn tick<C>(
        &mut self,
        players: Vec<Player>,
        config: &ArbitrationConfig,
        controller: &C,
    ) -> EngineResult
    where
        C: PlayerController + ?Sized,
    {
        let plan = self.plan(&players, config);
        let limit = config.command_timeout();

        let reports = join_all(
            plan.commands
                .iter()
                .cloned()
                .map(|command| deliver(controller, command, limit)),
        )
        .await;

        for report in &reports {
            self.record(report);
        }

        if let Some(window) = config.evict_after_ticks {
            for id in self.state.evict_unseen(window) {
                debug!(player = %id, "Evicted stale pause bookkeeping");
            }
        }

        EngineResult {
            tick: self.state.tick_count,
            commands: reports,
            suppressed: plan.suppressed,
            now_playing: plan.now_playing,
            players,
            paused_by_engine: ArbitrationState::sorted(&self.state.paused_by_engine),
            manually_paused: ArbitrationState::sorted(&self.state.manually_paused),
            last_active_player: self.state.last_active_player.clone(),
            pause_all: plan.pause_all,
        }
    }

    /// First half of a tick: advances the tick count, transition history and
    /// last active player, then decides commands without delivering them.
    ///
    /// Pause sets only change through [`record`](Self::record). Planning
    /// without recording the delivery results leaves manual-pause detection
    /// wrong on the next tick, hence crate-private.
    pub(crate) fn plan(&mut self, players: &[Player], config: &ArbitrationConfig) -> TickPlan {
        self.state.tick_count += 1;

        for (id, transition) in self.state.classify_transitions(players) {
            match transition {
                Transition::ManualPause => info!(player = %id, "Detected manual pause"),
                Transition::Resumed => {
                    debug!(player = %id, "Player resumed, pause bookkeeping cleared");
                }
                Transition::Unchanged => {}
            }
        }

        if config.pause_all_enabled {
            debug!("Pause all enabled, pausing all playing media");
            let wanted = players
                .iter()
                .filter(|p| p.is_playing())
                .map(|p| Command::pause(p.id.clone()))
                .collect();
            let (commands, suppressed) = self.split_suppressed(wanted);

            return TickPlan {
                commands,
                suppressed,
                now_playing: None,
                pause_all: true,
            };
        }

        let wanted = Self::arbitrate(players, &self.state);
        let (commands, suppressed) = self.split_suppressed(wanted);
        let now_playing = self.update_now_playing(players, config);

        TickPlan {
            commands,
            suppressed,
            now_playing,
            pause_all: false,
        }
    }

    /// Folds a delivery result into the pause sets.
    pub(crate) fn record(&mut self, report: &CommandReport) {
        let Command { kind, target } = &report.command;

        match &report.outcome {
            Ok(()) => {
                match kind {
                    CommandKind::Pause => info!(player = %target, "Paused player"),
                    CommandKind::Resume => info!(player = %target, "Resumed player"),
                }
                self.state.record_success(target, *kind);
            }
            Err(e) => warn!(player = %target, error = %e, "Command failed"),
        }
    }

    fn arbitrate(players: &[Player], state: &ArbitrationState) -> Vec<Command> {
        let Some(primary) = players.iter().find(|p| p.is_primary_candidate()) else {
            debug!("No primary player found, allowing others to play");
            return Vec::new();
        };

        let others = players.iter().filter(|p| p.id != primary.id);

        if primary.is_playing() {
            return others
                .filter(|p| p.is_playing())
                .map(|p| Command::pause(p.id.clone()))
                .collect();
        }

        let others: Vec<&Player> = others.collect();
        if others.iter().any(|p| p.is_playing()) {
            return Vec::new();
        }

        others
            .into_iter()
            .find(|p| p.status == PlaybackState::Paused && !state.manually_paused.contains(&p.id))
            .map(|p| vec![Command::resume(p.id.clone())])
            .unwrap_or_default()
    }

    fn split_suppressed(&self, wanted: Vec<Command>) -> (Vec<Command>, Vec<Command>) {
        wanted
            .into_iter()
            .partition(|command| !self.state.already_delivered(&command.target, command.kind))
    }

    fn update_now_playing(
        &mut self,
        players: &[Player],
        config: &ArbitrationConfig,
    ) -> Option<NowPlaying> {
        let primary = players.iter().find(|p| p.is_playing())?;

        if self.state.last_active_player.as_ref() == Some(&primary.id) {
            return None;
        }

        self.state.last_active_player = Some(primary.id.clone());

        Some(NowPlaying {
            player_id: primary.id.clone(),
            name: primary.name.clone(),
            title: primary.title.clone(),
            artist: primary.artist.clone(),
            notify: config.notifications_enabled,
        })
    }
}

async fn deliver<C>(controller: &C, command: Command, limit: Duration) -> CommandReport
where
    C: PlayerController + ?Sized,
{
    let call = async {
        match command.kind {
            CommandKind::Pause => controller.pause(&command.target).await,
            CommandKind::Resume => controller.resume(&command.target).await,
        }
    };

    let outcome = match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(CommandError::Timeout {
            player: command.target.clone(),
            after: limit,
        }),
    };

    CommandReport { command, outcome }
}
