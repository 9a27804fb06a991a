//! MediaSense - keeps one priority media source audible at a time.
//!
//! `mediasense run` monitors MPRIS players until interrupted; the other
//! subcommands answer one question and exit.

use std::{error::Error, path::Path, process, sync::Arc};

use clap::Parser;
use tokio::{signal, sync::broadcast::error::RecvError, task::JoinHandle};
use tracing::{debug, info, instrument, warn};

use mediasense::{
    arbitration::{Engine, FanoutSink, PollDriver, TracingSink},
    cli::{
        CheckCommand, Cli, CliCommand, Command, ConfigCommand, PlayersCommand, StatusCommand,
        formatting::format_error,
    },
    config::ConfigPaths,
    config_store::{ConfigSource, ConfigStore},
    runtime_state::StatusFileSink,
    services::MprisProvider,
    tracing_config,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    match cli.command() {
        CliCommand::Run => run(cli.config.as_deref()).await?,
        command => {
            tracing_config::init_cli_mode()?;
            run_cli_command(command, cli.config.as_deref()).await;
        }
    }

    Ok(())
}

fn load_store(config_path: Option<&Path>) -> mediasense::Result<ConfigStore> {
    let store = match config_path {
        Some(path) => ConfigStore::load_from(path)?,
        None => ConfigStore::load()?,
    };
    Ok(store)
}

/// Executes a one-shot command and prints its output.
///
/// Exits the process with status 1 when the command fails.
async fn run_cli_command(command: CliCommand, config_path: Option<&Path>) {
    let result = match load_store(config_path) {
        Ok(store) => {
            let config = store.get_current();
            let command: Box<dyn Command> = match command {
                CliCommand::Status => match ConfigPaths::status_file() {
                    Ok(path) => Box::new(StatusCommand::new(path)),
                    Err(e) => fail(&e.to_string()),
                },
                CliCommand::Players => Box::new(PlayersCommand::new(config.arbitration)),
                CliCommand::Config { schema } => {
                    Box::new(ConfigCommand::new(config).with_schema(schema))
                }
                CliCommand::Check | CliCommand::Run => Box::new(CheckCommand),
            };
            command.execute().await.map_err(|e| e.to_string())
        }
        Err(e) => Err(e.to_string()),
    };

    match result {
        Ok(output) => {
            if !output.trim().is_empty() {
                println!("{output}");
            }
        }
        Err(e) => fail(&e),
    }
}

fn fail(message: &str) -> ! {
    eprintln!("{}: {message}", format_error("Error"));
    process::exit(1);
}

/// Runs the monitoring service until SIGINT or SIGTERM.
async fn run(config_path: Option<&Path>) -> mediasense::Result<()> {
    let store = load_store(config_path)?;
    let _guard = tracing_config::init_with_file(store.get_current().general.log_level)?;
    info!("Starting MediaSense");

    let watcher = match store.start_file_watching() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!(error = %e, "Configuration hot reload disabled");
            None
        }
    };

    let provider = Arc::new(MprisProvider::connect(store.current().ignored_players).await?);
    let forwarder = forward_ignored_players(store.clone(), Arc::clone(&provider));

    let status_sink = Arc::new(StatusFileSink::new(ConfigPaths::status_file()?));
    let sink = FanoutSink::new()
        .with(Arc::new(TracingSink))
        .with(status_sink.clone());

    let driver = PollDriver::new(Engine::new(), provider, Arc::new(store), Arc::new(sink));
    driver.start();

    wait_for_shutdown().await;

    driver.shutdown().await;
    forwarder.abort();
    if let Some(watcher) = watcher {
        watcher.abort();
    }

    if let Err(e) = status_sink.mark_stopped().await {
        warn!(error = %e, "Failed to update status file");
    }

    info!("MediaSense stopped");
    Ok(())
}

/// Keeps the provider's ignored players in line with the configuration.
fn forward_ignored_players(store: ConfigStore, provider: Arc<MprisProvider>) -> JoinHandle<()> {
    let mut changes = store.subscribe();

    tokio::spawn(async move {
        loop {
            match changes.recv().await {
                Ok(change) if change.arbitration_changed => {
                    provider
                        .set_ignored_players(store.current().ignored_players)
                        .await;
                    debug!("Ignored players updated");
                }
                Ok(_) => {}
                Err(RecvError::Lagged(_)) => {
                    provider
                        .set_ignored_players(store.current().ignored_players)
                        .await;
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

#[instrument]
async fn wait_for_shutdown() {
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        result = signal::ctrl_c() => {
            if let Err(e) = result {
                warn!(error = %e, "Ctrl-C handler failed");
            }
            info!("Received interrupt");
        }
        () = terminate => info!("Received SIGTERM"),
    }
}
