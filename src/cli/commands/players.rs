use async_trait::async_trait;

use crate::{
    arbitration::{Player, PlayerProvider},
    cli::{CliError, Command, CommandResult, formatting::format_player_line},
    config::ArbitrationConfig,
    services::MprisProvider,
};

/// Command to list MPRIS players with their resolved priorities
///
/// Enumerates once; no commands are sent.
pub struct PlayersCommand {
    config: ArbitrationConfig,
}

impl PlayersCommand {
    /// Creates a new PlayersCommand classifying against `config`
    pub fn new(config: ArbitrationConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Command for PlayersCommand {
    async fn execute(&self) -> CommandResult {
        let provider = MprisProvider::connect(self.config.ignored_players.clone())
            .await
            .map_err(|e| CliError::ServiceError {
                service: "MPRIS".to_string(),
                details: e.to_string(),
            })?;

        let snapshots = provider
            .enumerate()
            .await
            .map_err(|e| CliError::ServiceError {
                service: "MPRIS".to_string(),
                details: e.to_string(),
            })?;

        if snapshots.is_empty() {
            return Ok("No media players found".to_string());
        }

        let mut output = format!("Found {} media player(s):\n\n", snapshots.len());
        for snapshot in snapshots {
            let player = Player::from_snapshot(snapshot, &self.config);
            let browser = if player.is_browser { " [browser]" } else { "" };
            output.push_str(&format!(
                "{}{browser}\n    {}\n",
                format_player_line(
                    player.status,
                    player.priority,
                    &player.name,
                    &player.title,
                    None
                ),
                player.id
            ));
        }

        Ok(output.trim_end().to_string())
    }
}
