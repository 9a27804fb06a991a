use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during CLI command execution.
#[derive(Error, Debug)]
pub enum CliError {
    /// An error occurred in the configuration system.
    ///
    /// Wraps loading, parsing and serialization failures of the config file.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A service the command depends on is unavailable.
    ///
    /// Used when the session bus or the MPRIS players cannot be reached.
    #[error("{service} service error: {details}")]
    ServiceError {
        /// Service that failed
        service: String,
        /// Error details
        details: String,
    },

    /// The runtime status file could not be read.
    #[error("Status error: {0}")]
    StatusError(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Type alias for command execution results.
///
/// Commands return their full output on success; the binary prints it.
pub type CommandResult = Result<String, CliError>;

/// Interface of the one-shot CLI commands.
///
/// Commands receive their dependencies through their constructors.
#[async_trait]
pub trait Command: Send + Sync {
    /// Executes the command and returns its output.
    ///
    /// # Errors
    ///
    /// Returns `CliError` when a dependency of the command is unavailable.
    async fn execute(&self) -> CommandResult;
}
