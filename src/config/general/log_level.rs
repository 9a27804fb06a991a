use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// How chatty the daemon's own log lines are.
///
/// D-Bus plumbing (`zbus`) is held at `warn` unless `trace` is selected, so
/// `debug` stays readable while tuning priorities.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Failures that stop arbitration, such as a lost session bus.
    Error,

    /// Players that ignore or time out on commands, skipped ticks.
    Warn,

    /// Pauses, resumes, manual pause detection and now-playing changes.
    #[default]
    Info,

    /// One summary per tick.
    Debug,

    /// Every enumerated player, including bus traffic.
    Trace,
}

impl LogLevel {
    /// Lowercase name, as written in the config file.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// Filter directive for `tracing_subscriber::EnvFilter`.
    pub fn directive(self) -> String {
        match self {
            LogLevel::Trace => LogLevel::Trace.as_str().to_string(),
            level => format!("{},zbus=warn", level.as_str()),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
