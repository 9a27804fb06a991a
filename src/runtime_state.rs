use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{debug, instrument, warn};

use crate::{
    arbitration::{EngineResult, EventSink, NowPlaying, PlaybackState, PlayerId},
    core::{MediaSenseError, Result},
};

/// Why a player is paused, as far as the engine knows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PauseReason {
    /// Paused by the engine
    Auto,
    /// Paused by the user
    Manual,
}

/// One player as last seen by the running service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStatus {
    /// Player instance identifier
    pub id: PlayerId,
    /// Lowercase player name
    pub name: String,
    /// Observed playback state
    pub status: PlaybackState,
    /// Track title
    pub title: String,
    /// Track artist(s)
    pub artist: String,
    /// Resolved priority
    pub priority: u32,
    /// Pause bookkeeping for this player
    pub pause_reason: Option<PauseReason>,
}

/// Snapshot of the running service, shared with `mediasense status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeStatus {
    /// Whether the poll loop is running
    pub running: bool,
    /// Whether the pause-all override was active on the last tick
    pub pause_all: bool,
    /// Sequence number of the last tick
    pub tick: u64,
    /// Most recent now-playing player
    pub last_active_player: Option<PlayerId>,
    /// Players in enumeration order
    pub players: Vec<PlayerStatus>,
    /// Last time this status was written
    pub updated_at: DateTime<Local>,
}

impl RuntimeStatus {
    /// Status describing a completed tick.
    pub fn from_result(result: &EngineResult) -> Self {
        let players = result
            .players
            .iter()
            .map(|player| {
                let pause_reason = if result.paused_by_engine.contains(&player.id) {
                    Some(PauseReason::Auto)
                } else if result.manually_paused.contains(&player.id) {
                    Some(PauseReason::Manual)
                } else {
                    None
                };

                PlayerStatus {
                    id: player.id.clone(),
                    name: player.name.clone(),
                    status: player.status,
                    title: player.title.clone(),
                    artist: player.artist.clone(),
                    priority: player.priority,
                    pause_reason,
                }
            })
            .collect();

        Self {
            running: true,
            pause_all: result.pause_all,
            tick: result.tick,
            last_active_player: result.last_active_player.clone(),
            players,
            updated_at: Local::now(),
        }
    }

    /// Load the status file, `None` if the service never wrote one
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read or parsed
    #[instrument]
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path)?;
        let status =
            serde_json::from_str(&content).map_err(|e| MediaSenseError::status_file(e, path))?;
        Ok(Some(status))
    }

    /// Write the status file, replacing it atomically
    ///
    /// # Errors
    /// Returns error if the file or its directory cannot be written
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content =
            serde_json::to_string_pretty(self).map_err(|e| MediaSenseError::status_file(e, path))?;
        let temp = path.with_extension("json.tmp");
        fs::write(&temp, content)?;
        fs::rename(&temp, path)?;

        Ok(())
    }

    /// Flag the status file as stopped, keeping the last known players
    ///
    /// # Errors
    /// Returns error if the file cannot be read or written
    pub fn mark_stopped(path: &Path) -> Result<()> {
        let Some(mut status) = Self::load(path)? else {
            return Ok(());
        };

        status.running = false;
        status.updated_at = Local::now();
        status.save(path)
    }
}

/// Mirrors every completed tick into the runtime status file.
///
/// Writes run on tokio's blocking pool so the tick never waits on the disk.
/// They are serialized, and a write for an older tick than the one already
/// on disk is dropped.
#[derive(Debug, Clone)]
pub struct StatusFileSink {
    path: PathBuf,
    last_written: Arc<Mutex<u64>>,
    pending: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl StatusFileSink {
    /// Sink writing to `path`.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            last_written: Arc::new(Mutex::new(0)),
            pending: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// The status file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Waits until every queued write has finished.
    pub async fn flush(&self) {
        let handles = std::mem::take(
            &mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner),
        );

        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "Status file write ended abnormally");
            }
        }
    }

    /// Flushes pending writes, then flags the file as stopped.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or written
    pub async fn mark_stopped(&self) -> Result<()> {
        self.flush().await;

        let _written = self.last_written.lock().unwrap_or_else(PoisonError::into_inner);
        RuntimeStatus::mark_stopped(&self.path)
    }
}

fn write_if_newer(path: &Path, last_written: &Mutex<u64>, status: &RuntimeStatus) {
    let mut last = last_written.lock().unwrap_or_else(PoisonError::into_inner);
    if status.tick < *last {
        debug!(tick = status.tick, last = *last, "Dropping outdated status write");
        return;
    }

    match status.save(path) {
        Ok(()) => {
            *last = status.tick;
            debug!(tick = status.tick, "Status file updated");
        }
        Err(e) => warn!(error = %e, "Failed to write status file"),
    }
}

impl EventSink for StatusFileSink {
    fn on_now_playing(&self, _event: &NowPlaying) {}

    fn on_state_changed(&self, result: &EngineResult) {
        let status = RuntimeStatus::from_result(result);

        let Ok(runtime) = Handle::try_current() else {
            write_if_newer(&self.path, &self.last_written, &status);
            return;
        };

        let path = self.path.clone();
        let last_written = Arc::clone(&self.last_written);
        let handle = runtime.spawn_blocking(move || write_if_newer(&path, &last_written, &status));

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.retain(|handle| !handle.is_finished());
        pending.push(handle);
    }
}
