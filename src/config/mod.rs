//! Configuration schema definitions and validation.
//!
//! Defines the complete configuration structure for MediaSense: general
//! process settings and the arbitration policy. All configurations are
//! serializable to/from TOML format.

mod arbitration;
mod error;
mod general;
mod loading;
mod paths;

#[cfg(test)]
mod tests;

pub use arbitration::{ArbitrationConfig, DEFAULT_PRIORITY, PRIMARY_PRIORITY};
pub use error::ConfigError;
pub use general::{GeneralConfig, LogLevel};
pub use paths::ConfigPaths;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Main configuration structure for MediaSense.
///
/// Represents the complete configuration schema that can be loaded
/// from TOML files. All fields have sensible defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
pub struct Config {
    /// General application settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Playback arbitration policy.
    #[serde(default)]
    pub arbitration: ArbitrationConfig,
}

impl Config {
    /// Validates every section.
    ///
    /// # Errors
    /// Returns `ConfigError::Validation` for the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.arbitration.validate()
    }
}
