use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::ConfigError;

use super::{ConfigStore, file_watcher::FileWatcher};

const DEBOUNCE: Duration = Duration::from_millis(500);

impl ConfigStore {
    /// Starts monitoring the backing file and reloads it after changes.
    ///
    /// Bursts of events are debounced. A reload that fails to parse or
    /// validate is logged and the previous configuration stays active.
    /// Aborting the returned handle stops the watching.
    ///
    /// # Errors
    /// Returns `ConfigError::Watch` if the store has no backing file or the
    /// watcher cannot be initialized.
    pub fn start_file_watching(&self) -> Result<JoinHandle<()>, ConfigError> {
        let path = self
            .path()
            .ok_or_else(|| ConfigError::Watch("store is not backed by a file".to_string()))?
            .to_path_buf();

        let (watcher, mut event_rx) = FileWatcher::new(&path)
            .map_err(|e| ConfigError::Watch(format!("Failed to create file watcher: {e}")))?;

        let store = self.clone();
        info!(path = %path.display(), "Watching configuration file");

        Ok(tokio::spawn(async move {
            let _watcher = watcher;
            let mut pending = false;

            let debounce_sleep = tokio::time::sleep(DEBOUNCE);
            tokio::pin!(debounce_sleep);

            loop {
                tokio::select! {
                    event = event_rx.recv() => {
                        let Some(event) = event else {
                            break;
                        };
                        debug!(kind = ?event.kind, "Configuration file event");
                        pending = true;
                        debounce_sleep.as_mut().reset(tokio::time::Instant::now() + DEBOUNCE);
                    }

                    _ = &mut debounce_sleep, if pending => {
                        pending = false;
                        match store.reload() {
                            Ok(true) => info!("Configuration reloaded"),
                            Ok(false) => debug!("Configuration file unchanged"),
                            Err(e) => warn!(error = %e, "Keeping previous configuration"),
                        }
                    }
                }
            }
        }))
    }
}
