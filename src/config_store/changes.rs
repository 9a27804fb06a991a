use std::time::Instant;

/// Origin of a configuration change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeSource {
    /// The configuration file was edited on disk
    FileEdit,
    /// The host updated the configuration in memory
    Programmatic,
}

/// Announces that the active configuration was replaced.
///
/// Subscribers read the new values from the store; the change only says
/// where it came from and which sections differ.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigChange {
    /// Where the change came from
    pub source: ChangeSource,
    /// Whether the `[general]` section differs
    pub general_changed: bool,
    /// Whether the `[arbitration]` section differs
    pub arbitration_changed: bool,
    /// When the change was applied
    pub timestamp: Instant,
}

impl ConfigChange {
    /// Creates a new change record stamped with the current time.
    pub fn new(source: ChangeSource, general_changed: bool, arbitration_changed: bool) -> Self {
        Self {
            source,
            general_changed,
            arbitration_changed,
            timestamp: Instant::now(),
        }
    }
}
