use std::{
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use tokio::sync::broadcast;
use tracing::{info, instrument};

use crate::config::{ArbitrationConfig, Config, ConfigError, ConfigPaths};

use super::{ChangeSource, ConfigChange};

/// Source of the configuration snapshot read at the start of every tick.
pub trait ConfigSource: Send + Sync {
    /// The current, already validated arbitration settings.
    fn current(&self) -> ArbitrationConfig;
}

impl ConfigSource for ArbitrationConfig {
    fn current(&self) -> ArbitrationConfig {
        self.clone()
    }
}

/// A thread-safe configuration store that manages settings and broadcasts changes
///
/// Every value it holds has passed validation: updates and reloads that fail
/// validation are rejected and the previous configuration stays active.
#[derive(Clone)]
pub struct ConfigStore {
    path: Option<PathBuf>,

    config: Arc<RwLock<Config>>,

    change_sender: broadcast::Sender<ConfigChange>,
}

impl ConfigStore {
    /// Creates a store holding the default configuration, not backed by a file
    pub fn with_defaults() -> Self {
        Self::from_config(Config::default(), None)
    }

    /// Loads the store from the main configuration file, creating it with
    /// defaults when missing
    ///
    /// # Errors
    /// Returns `ConfigError` if the path cannot be resolved or the file cannot
    /// be created, read, parsed or validated
    pub fn load() -> Result<Self, ConfigError> {
        let path = ConfigPaths::main_config()?;
        Self::load_from(&path)
    }

    /// Loads the store from `path`, creating it with defaults when missing
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be created, read, parsed or
    /// validated
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config = Config::load_or_create(path)?;
        Ok(Self::from_config(config, Some(path.to_path_buf())))
    }

    fn from_config(config: Config, path: Option<PathBuf>) -> Self {
        let (change_sender, _) = broadcast::channel(64);

        Self {
            path,
            config: Arc::new(RwLock::new(config)),
            change_sender,
        }
    }

    /// File backing this store, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns a clone of the current configuration, handling poisoned locks gracefully
    pub fn get_current(&self) -> Config {
        match self.config.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Subscribes to configuration changes
    pub fn subscribe(&self) -> broadcast::Receiver<ConfigChange> {
        self.change_sender.subscribe()
    }

    /// Applies an in-memory change to the arbitration settings
    ///
    /// The file on disk is left untouched, so an edit to the file later
    /// replaces this change.
    ///
    /// # Errors
    /// Returns `ConfigError::Validation` if the updated settings are invalid;
    /// the previous settings stay active in that case
    pub fn update_arbitration(
        &self,
        update: impl FnOnce(&mut ArbitrationConfig),
    ) -> Result<(), ConfigError> {
        let mut next = self.get_current();
        update(&mut next.arbitration);
        self.replace(next, ChangeSource::Programmatic).map(|_| ())
    }

    /// Re-reads the backing file
    ///
    /// Returns whether the active configuration changed.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read, parsed or validated;
    /// the previous configuration stays active in that case
    #[instrument(skip(self))]
    pub fn reload(&self) -> Result<bool, ConfigError> {
        let Some(path) = &self.path else {
            return Ok(false);
        };

        let next = Config::load(path)?;
        self.replace(next, ChangeSource::FileEdit)
    }

    fn replace(&self, next: Config, source: ChangeSource) -> Result<bool, ConfigError> {
        next.validate()?;

        let change = {
            let mut config = match self.config.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };

            if *config == next {
                return Ok(false);
            }

            let change = ConfigChange::new(
                source,
                config.general != next.general,
                config.arbitration != next.arbitration,
            );
            *config = next;
            change
        };

        info!(?source, "Configuration updated");
        let _ = self.change_sender.send(change);
        Ok(true)
    }
}

impl ConfigSource for ConfigStore {
    fn current(&self) -> ArbitrationConfig {
        match self.config.read() {
            Ok(guard) => guard.arbitration.clone(),
            Err(poisoned) => poisoned.into_inner().arbitration.clone(),
        }
    }
}
