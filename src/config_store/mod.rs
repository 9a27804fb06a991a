//! Live configuration with change tracking.
//!
//! Holds the validated configuration behind a lock, reloads it when the file
//! changes on disk, and hands the arbitration engine a fresh snapshot at the
//! start of every tick.

mod changes;
mod file_watcher;
mod file_watching;
mod store;

#[cfg(test)]
mod tests;

pub use changes::{ChangeSource, ConfigChange};
pub use file_watcher::{FileEvent, FileEventKind, FileWatcher};
pub use store::{ConfigSource, ConfigStore};
