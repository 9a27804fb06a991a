use async_trait::async_trait;

use crate::{
    arbitration::PlayerProvider,
    cli::{CliError, Command, CommandResult, formatting::format_success},
    services::MprisProvider,
};

/// Command to verify that MPRIS players can be reached
pub struct CheckCommand;

#[async_trait]
impl Command for CheckCommand {
    async fn execute(&self) -> CommandResult {
        let provider = MprisProvider::connect(Vec::new())
            .await
            .map_err(|e| CliError::ServiceError {
                service: "D-Bus".to_string(),
                details: e.to_string(),
            })?;

        let players = provider
            .enumerate()
            .await
            .map_err(|e| CliError::ServiceError {
                service: "MPRIS".to_string(),
                details: e.to_string(),
            })?;

        Ok(format!(
            "{}\n{} MPRIS player(s) visible",
            format_success("Session bus reachable"),
            players.len()
        ))
    }
}
