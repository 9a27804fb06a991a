use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};
use zbus::{Connection, fdo, proxy::CacheProperties};

use crate::arbitration::{
    CommandError, PlaybackState, PlayerController, PlayerId, PlayerProvider, PlayerSnapshot,
    ProviderError,
};

use super::{MediaPlayer2PlayerProxy, TrackInfo};

/// Well-known bus name prefix shared by all MPRIS players.
pub const MPRIS_BUS_PREFIX: &str = "org.mpris.MediaPlayer2.";

/// Player provider backed by MPRIS players on the session bus.
///
/// Players are listed in bus name order. Each enumeration reads status and
/// metadata fresh; nothing is cached between ticks.
#[derive(Clone)]
pub struct MprisProvider {
    connection: Connection,
    ignored_players: Arc<RwLock<Vec<String>>>,
}

impl MprisProvider {
    /// Connects to the session bus.
    ///
    /// Bus names containing any of `ignored_players` are skipped.
    ///
    /// # Errors
    /// Returns `ProviderError::Unavailable` if the session bus cannot be reached.
    #[instrument(skip(ignored_players))]
    pub async fn connect(ignored_players: Vec<String>) -> Result<Self, ProviderError> {
        let connection = Connection::session()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("session bus: {e}")))?;

        info!("Connected to session bus");
        Ok(Self::with_connection(connection, ignored_players))
    }

    /// Wraps an existing connection.
    pub fn with_connection(connection: Connection, ignored_players: Vec<String>) -> Self {
        Self {
            connection,
            ignored_players: Arc::new(RwLock::new(ignored_players)),
        }
    }

    /// Replaces the ignored bus name patterns. Applies from the next enumeration.
    pub async fn set_ignored_players(&self, patterns: Vec<String>) {
        *self.ignored_players.write().await = patterns;
    }

    async fn should_ignore_player(&self, bus_name: &str) -> bool {
        let ignored = self.ignored_players.read().await;
        ignored.iter().any(|pattern| bus_name.contains(pattern.as_str()))
    }

    async fn player_proxy(
        &self,
        id: &PlayerId,
    ) -> zbus::Result<MediaPlayer2PlayerProxy<'static>> {
        MediaPlayer2PlayerProxy::builder(&self.connection)
            .destination(bus_name(id))?
            .cache_properties(CacheProperties::No)
            .build()
            .await
    }

    async fn snapshot(&self, id: PlayerId) -> Option<PlayerSnapshot> {
        let proxy = match self.player_proxy(&id).await {
            Ok(proxy) => proxy,
            Err(e) => {
                warn!(player = %id, error = %e, "Failed to create player proxy");
                return None;
            }
        };

        let status = match proxy.playback_status().await {
            Ok(status) => PlaybackState::from(status.as_str()),
            Err(e) => {
                warn!(player = %id, error = %e, "Skipping player, status unavailable");
                return None;
            }
        };

        let track = match proxy.metadata().await {
            Ok(metadata) => TrackInfo::from(&metadata),
            Err(e) => {
                debug!(player = %id, error = %e, "Metadata unavailable");
                TrackInfo::default()
            }
        };

        Some(PlayerSnapshot::new(id, status).with_track(track.title, track.artist))
    }

    async fn call(&self, id: &PlayerId, play: bool) -> Result<(), CommandError> {
        let proxy = self
            .player_proxy(id)
            .await
            .map_err(|e| command_error(id, e))?;

        let result = if play {
            proxy.play().await
        } else {
            proxy.pause().await
        };

        result.map_err(|e| command_error(id, e))
    }
}

#[async_trait]
impl PlayerController for MprisProvider {
    async fn pause(&self, id: &PlayerId) -> Result<(), CommandError> {
        self.call(id, false).await
    }

    async fn resume(&self, id: &PlayerId) -> Result<(), CommandError> {
        self.call(id, true).await
    }
}

#[async_trait]
impl PlayerProvider for MprisProvider {
    async fn enumerate(&self) -> Result<Vec<PlayerSnapshot>, ProviderError> {
        let dbus_proxy = fdo::DBusProxy::new(&self.connection)
            .await
            .map_err(|e| ProviderError::Bus(format!("DBus proxy failed: {e}")))?;

        let names = dbus_proxy
            .list_names()
            .await
            .map_err(|e| ProviderError::Bus(e.to_string()))?;

        let mut ids = Vec::new();
        for name in names {
            let name = name.as_str();
            if !name.starts_with(MPRIS_BUS_PREFIX) || self.should_ignore_player(name).await {
                continue;
            }
            ids.push(PlayerId::from_bus_name(name));
        }
        ids.sort();

        let snapshots = join_all(ids.into_iter().map(|id| self.snapshot(id))).await;
        Ok(snapshots.into_iter().flatten().collect())
    }
}

impl PlayerId {
    /// Id of the player owning an MPRIS bus name.
    pub fn from_bus_name(bus_name: &str) -> Self {
        Self::new(bus_name.strip_prefix(MPRIS_BUS_PREFIX).unwrap_or(bus_name))
    }
}

/// Full MPRIS bus name of a player.
pub fn bus_name(id: &PlayerId) -> String {
    format!("{MPRIS_BUS_PREFIX}{id}")
}

fn command_error(id: &PlayerId, error: zbus::Error) -> CommandError {
    match fdo::Error::from(error) {
        fdo::Error::ServiceUnknown(_) | fdo::Error::NameHasNoOwner(_) => {
            CommandError::PlayerNotFound(id.clone())
        }
        other => CommandError::Failed {
            player: id.clone(),
            details: other.to_string(),
        },
    }
}
