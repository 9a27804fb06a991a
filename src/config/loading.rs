use std::{fs, path::Path};

use tracing::{info, instrument};

use super::{Config, ConfigError};

const DEFAULT_HEADER: &str = "# MediaSense configuration file\n\
# Priority 1 players are primary sources; any other playing player is paused\n\
# while a primary plays. Unlisted players get `default_priority`.\n\n";

impl Config {
    /// Loads the configuration at `path`, writing the defaults there first
    /// when the file does not exist yet.
    ///
    /// Missing keys fall back to their defaults, so a partial file only has to
    /// name what it changes.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created or read, is not valid
    /// TOML, or fails validation.
    #[instrument(fields(path = %path.display()))]
    pub fn load_or_create(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            info!("No configuration file found, writing defaults");
            Self::default().write_default_file(path)?;
        }

        Self::load(path)
    }

    /// Loads and validates the configuration file at `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// fails validation.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::io(e, path))?;
        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::parse(e, Some(path)))?;

        config.validate()?;
        Ok(config)
    }

    /// Parses and validates configuration from an in-memory TOML string.
    ///
    /// # Errors
    /// Returns an error if the string is not valid TOML or fails validation.
    pub fn from_toml_str(content: &str) -> Result<Config, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|e| ConfigError::parse(e, None))?;

        config.validate()?;
        Ok(config)
    }

    /// Renders this configuration as TOML.
    ///
    /// # Errors
    /// Returns `ConfigError::Parse` if serialization fails.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::parse(e, None))
    }

    fn write_default_file(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::io(e, parent))?;
        }

        let body = self.to_toml_string()?;
        fs::write(path, format!("{DEFAULT_HEADER}{body}")).map_err(|e| ConfigError::io(e, path))
    }
}
