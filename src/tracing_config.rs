use std::env;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    config::{ConfigPaths, LogLevel},
    core::{MediaSenseError, Result},
};

const FORMAT_VAR: &str = "MEDIASENSE_LOG_FORMAT";
const DAYS_TO_KEEP: usize = 7;

fn env_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()))
}

fn json_requested() -> bool {
    env::var(FORMAT_VAR).is_ok_and(|format| format == "json")
}

/// Initialize tracing for one-shot commands
///
/// Logs only warnings and errors to stderr so command output stays clean.
/// `RUST_LOG` overrides the level.
///
/// # Errors
/// Returns error if a global subscriber is already installed
pub fn init_cli_mode() -> Result<()> {
    tracing_subscriber::registry()
        .with(env_filter(LogLevel::Warn))
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .map_err(|e| MediaSenseError::Logging(e.to_string()))
}

/// Initialize tracing with file output
///
/// Logs to stdout and to a daily rolling file in the MediaSense log
/// directory, keeping a week of files. `RUST_LOG` overrides `level`; setting
/// `MEDIASENSE_LOG_FORMAT=json` switches both outputs to JSON.
///
/// The returned guard flushes the file writer when dropped and must be held
/// for the lifetime of the process.
///
/// # Errors
/// Returns error if the log directory cannot be created or tracing
/// subscriber initialization fails
pub fn init_with_file(level: LogLevel) -> Result<WorkerGuard> {
    let log_dir = ConfigPaths::log_dir()?;

    let file_appender = tracing_appender::rolling::Builder::new()
        .rotation(tracing_appender::rolling::Rotation::DAILY)
        .max_log_files(DAYS_TO_KEEP)
        .filename_prefix("mediasense")
        .filename_suffix("log")
        .build(&log_dir)
        .map_err(|e| MediaSenseError::Logging(e.to_string()))?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let registry = tracing_subscriber::registry().with(env_filter(level));

    let result = if json_requested() {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stdout),
            )
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(non_blocking)
                    .with_ansi(false),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .compact()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stdout),
            )
            .with(
                fmt::layer()
                    .compact()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(non_blocking)
                    .with_ansi(false),
            )
            .try_init()
    };

    result.map_err(|e| MediaSenseError::Logging(e.to_string()))?;
    Ok(guard)
}
