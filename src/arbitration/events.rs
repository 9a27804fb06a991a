use std::sync::Arc;

use async_stream::stream;
use futures::Stream;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::{Command, CommandReport, Player, PlayerId, player::display_name};

/// A different player became the first audible one
#[derive(Debug, Clone, PartialEq)]
pub struct NowPlaying {
    /// Player instance identifier
    pub player_id: PlayerId,
    /// Lowercase player name
    pub name: String,
    /// Track title
    pub title: String,
    /// Track artist(s)
    pub artist: String,
    /// Whether the user asked for notifications. Sinks decide what to do
    /// with it; the event is emitted either way.
    pub notify: bool,
}

impl NowPlaying {
    /// Notification headline, e.g. "Now Playing: Firefox".
    pub fn summary(&self) -> String {
        format!("Now Playing: {}", display_name(&self.name))
    }

    /// Notification body, "title - artist".
    pub fn body(&self) -> String {
        format!("{} - {}", self.title, self.artist)
    }
}

/// Everything one tick decided and observed
#[derive(Debug, Clone, PartialEq)]
pub struct EngineResult {
    /// Sequence number of the tick, starting at 1
    pub tick: u64,
    /// Commands issued this tick with their delivery results
    pub commands: Vec<CommandReport>,
    /// Commands not reissued because they already reached an unchanged player
    pub suppressed: Vec<Command>,
    /// Now-playing change, if any
    pub now_playing: Option<NowPlaying>,
    /// Classified players in enumeration order, statuses as observed
    pub players: Vec<Player>,
    /// Players the engine paused, sorted
    pub paused_by_engine: Vec<PlayerId>,
    /// Players paused by the user, sorted
    pub manually_paused: Vec<PlayerId>,
    /// Most recent now-playing player
    pub last_active_player: Option<PlayerId>,
    /// Whether the pause-all override decided this tick
    pub pause_all: bool,
}

impl EngineResult {
    /// Commands that were issued, regardless of outcome.
    pub fn issued(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter().map(|report| &report.command)
    }

    /// Reports of commands that failed.
    pub fn failures(&self) -> impl Iterator<Item = &CommandReport> {
        self.commands.iter().filter(|report| !report.succeeded())
    }
}

/// Consumer of engine events.
///
/// Delivery is fire-and-forget: sinks handle their own failures and never
/// influence arbitration.
pub trait EventSink: Send + Sync {
    /// A new player became the first audible one.
    fn on_now_playing(&self, event: &NowPlaying);

    /// A tick completed.
    fn on_state_changed(&self, result: &EngineResult);
}

/// Writes engine events to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn on_now_playing(&self, event: &NowPlaying) {
        info!(
            player = %event.player_id,
            notify = event.notify,
            "{}: {}",
            event.summary(),
            event.body()
        );
    }

    fn on_state_changed(&self, result: &EngineResult) {
        let playing = result.players.iter().filter(|p| p.is_playing()).count();
        debug!(
            tick = result.tick,
            players = result.players.len(),
            playing,
            commands = result.commands.len(),
            auto_paused = result.paused_by_engine.len(),
            manually_paused = result.manually_paused.len(),
            "Tick complete"
        );
    }
}

/// Event published by [`ChannelSink`]
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// Now-playing change
    NowPlaying(NowPlaying),
    /// Completed tick
    StateChanged(Arc<EngineResult>),
}

/// Publishes engine events on a broadcast channel.
///
/// Events of tick N are all sent before tick N+1 starts, so subscribers see
/// them in tick order.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: broadcast::Sender<EngineEvent>,
}

impl ChannelSink {
    /// Create a sink buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.sender.subscribe()
    }

    /// Stream of events published from now on.
    ///
    /// Lagging subscribers skip the missed events and keep going.
    pub fn events(&self) -> impl Stream<Item = EngineEvent> + Send + 'static {
        let mut rx = self.sender.subscribe();

        stream! {
            loop {
                match rx.recv().await {
                    Ok(event) => yield event,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Engine event subscriber lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }
}

impl Default for ChannelSink {
    fn default() -> Self {
        Self::new(64)
    }
}

impl EventSink for ChannelSink {
    fn on_now_playing(&self, event: &NowPlaying) {
        let _ = self.sender.send(EngineEvent::NowPlaying(event.clone()));
    }

    fn on_state_changed(&self, result: &EngineResult) {
        let _ = self
            .sender
            .send(EngineEvent::StateChanged(Arc::new(result.clone())));
    }
}

/// Forwards every event to several sinks in order.
#[derive(Clone, Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl FanoutSink {
    /// Empty fan-out.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sink.
    pub fn with(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl EventSink for FanoutSink {
    fn on_now_playing(&self, event: &NowPlaying) {
        for sink in &self.sinks {
            sink.on_now_playing(event);
        }
    }

    fn on_state_changed(&self, result: &EngineResult) {
        for sink in &self.sinks {
            sink.on_state_changed(result);
        }
    }
}
