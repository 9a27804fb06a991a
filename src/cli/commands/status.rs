use std::path::PathBuf;

use async_trait::async_trait;

use crate::{
    cli::{CliError, Command, CommandResult, formatting::format_status},
    runtime_state::RuntimeStatus,
};

/// Command to show what the running service last observed
///
/// Reads the status file the service rewrites after every tick.
pub struct StatusCommand {
    path: PathBuf,
}

impl StatusCommand {
    /// Creates a new StatusCommand reading `path`
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl Command for StatusCommand {
    async fn execute(&self) -> CommandResult {
        let status =
            RuntimeStatus::load(&self.path).map_err(|e| CliError::StatusError(e.to_string()))?;

        match status {
            Some(status) => Ok(format_status(&status)),
            None => Ok("MediaSense has not run yet (no status file)".to_string()),
        }
    }
}
