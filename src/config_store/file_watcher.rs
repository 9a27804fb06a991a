use std::path::{Path, PathBuf};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher, recommended_watcher};
use tokio::sync::mpsc;

/// Represents a file system event for the watched file.
#[derive(Debug, Clone)]
pub struct FileEvent {
    /// The path of the file that changed
    pub path: PathBuf,
    /// The type of change that occurred
    pub kind: FileEventKind,
}

/// The type of file system change that occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileEventKind {
    /// File was modified
    Modified,
    /// File was created
    Created,
    /// File was removed
    Removed,
}

/// Watches a single configuration file.
///
/// Editors commonly replace a file instead of writing it in place, so the
/// parent directory is watched and events are filtered down to the file's
/// name. Events are forwarded to a Tokio channel.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    path: PathBuf,
}

impl FileWatcher {
    /// Starts watching `path` and returns the watcher and event receiver.
    ///
    /// Uses an unbounded channel since file events are infrequent but bursty.
    /// Dropping the watcher stops the events.
    ///
    /// # Errors
    /// Returns error if the path has no parent directory or the underlying
    /// file system watcher cannot be initialized.
    pub fn new(path: &Path) -> Result<(Self, mpsc::UnboundedReceiver<FileEvent>), notify::Error> {
        let parent = path
            .parent()
            .ok_or_else(|| notify::Error::path_not_found().add_path(path.to_path_buf()))?;
        let file_name = path.file_name().map(ToOwned::to_owned);

        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let mut watcher = recommended_watcher(move |res: notify::Result<Event>| {
            let Ok(event) = res else {
                return;
            };

            let kind = match event.kind {
                EventKind::Create(_) => FileEventKind::Created,
                EventKind::Modify(_) => FileEventKind::Modified,
                EventKind::Remove(_) => FileEventKind::Removed,
                _ => return,
            };

            for path in event.paths {
                if path.file_name().map(ToOwned::to_owned) != file_name {
                    continue;
                }
                let _ = event_tx.send(FileEvent { path, kind });
            }
        })?;

        watcher.watch(parent, RecursiveMode::NonRecursive)?;

        Ok((
            Self {
                _watcher: watcher,
                path: path.to_path_buf(),
            },
            event_rx,
        ))
    }

    /// The watched file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
