use std::path::Path;

use thiserror::Error;

use crate::{arbitration::ProviderError, config::ConfigError};

/// Error types for the MediaSense binary.
///
/// A running engine never sees these; they cover startup, the one-shot
/// commands and the status file.
#[derive(Error, Debug)]
pub enum MediaSenseError {
    /// Configuration could not be loaded or validated
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The media-control surface could not be reached
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Filesystem operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The runtime status file could not be read or written
    #[error("invalid status file at {path}: {details}")]
    StatusFile {
        /// Status file location
        path: String,
        /// Error details
        details: String,
    },

    /// Logging could not be initialized
    #[error("failed to initialize logging: {0}")]
    Logging(String),
}

/// Result type for MediaSense operations.
pub type Result<T> = std::result::Result<T, MediaSenseError>;

impl MediaSenseError {
    /// Status file error for `path`.
    pub fn status_file(error: impl std::fmt::Display, path: &Path) -> Self {
        Self::StatusFile {
            path: path.display().to_string(),
            details: error.to_string(),
        }
    }
}
