//! Command-line interface.
//!
//! `mediasense run` (the default) starts the service; the other subcommands
//! are one-shot queries that print their output and exit.

mod commands;
pub mod formatting;
mod types;

#[cfg(test)]
mod tests;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{CheckCommand, ConfigCommand, PlayersCommand, StatusCommand};
pub use types::{CliError, Command, CommandResult};

/// Top-level command line
#[derive(Debug, Parser)]
#[command(name = "mediasense")]
#[command(version, about = "Keeps one priority source audible across MPRIS media players")]
pub struct Cli {
    /// Configuration file to use instead of the default location
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<CliCommand>,
}

/// Available subcommands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum CliCommand {
    /// Monitor players and arbitrate playback until interrupted
    Run,
    /// Show what the running service last observed
    Status,
    /// List MPRIS players with their resolved priorities
    Players,
    /// Print the effective configuration
    Config {
        /// Print the JSON schema of the configuration file instead
        #[arg(long)]
        schema: bool,
    },
    /// Verify that the session bus and MPRIS players are reachable
    Check,
}

impl Cli {
    /// The requested subcommand, `run` when none was given.
    pub fn command(&self) -> CliCommand {
        self.command.unwrap_or(CliCommand::Run)
    }
}
