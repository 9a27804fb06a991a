use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors raised while loading, validating or watching configuration.
///
/// The arbitration engine never sees these: it only ever receives a
/// configuration that already passed [`validate`](super::ArbitrationConfig::validate).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A field holds a value the engine cannot work with
    #[error("invalid config field '{field}': {reason}")]
    Validation {
        /// Dotted path of the offending field
        field: String,
        /// Why the value was rejected
        reason: String,
    },

    /// Reading or writing a configuration file failed
    #[error("I/O error on '{path}': {details}")]
    Io {
        /// File that could not be accessed
        path: PathBuf,
        /// Underlying error details
        details: String,
    },

    /// The file is not valid TOML or does not match the schema
    #[error("failed to parse TOML at '{location}': {details}")]
    Parse {
        /// File path, or "string" for in-memory input
        location: String,
        /// Parser error details
        details: String,
    },

    /// Neither XDG_CONFIG_HOME nor HOME could be resolved
    #[error("cannot determine configuration directory: {0}")]
    Paths(#[from] io::Error),

    /// The file watcher could not be set up
    #[error("file watch error: {0}")]
    Watch(String),
}

impl ConfigError {
    /// Builds a validation error for `field`.
    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates a parse error with optional file path context.
    pub fn parse(error: impl std::fmt::Display, path: Option<&std::path::Path>) -> Self {
        let location = match path {
            Some(p) => {
                let clean_path = p.canonicalize().unwrap_or_else(|_| p.to_path_buf());
                clean_path.to_string_lossy().to_string()
            }
            None => "string".to_string(),
        };

        Self::Parse {
            location,
            details: error.to_string(),
        }
    }

    /// Wraps an I/O failure on `path`.
    pub fn io(error: impl std::fmt::Display, path: &std::path::Path) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            details: error.to_string(),
        }
    }
}
