use std::{
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info, instrument, warn};

use crate::config::ArbitrationConfig;
use crate::config_store::ConfigSource;

use super::{Engine, EngineResult, EventSink, Player, PlayerProvider, ProviderError};

/// Result of one poll tick
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// The engine ran against a fresh snapshot
    Completed(EngineResult),
    /// Enumeration failed; arbitration state was not touched
    Skipped(ProviderError),
}

impl TickOutcome {
    /// The engine result, when the tick completed.
    pub fn result(&self) -> Option<&EngineResult> {
        match self {
            Self::Completed(result) => Some(result),
            Self::Skipped(_) => None,
        }
    }
}

struct Shared {
    engine: tokio::sync::Mutex<Engine>,
    provider: Arc<dyn PlayerProvider>,
    config: Arc<dyn ConfigSource>,
    sink: Arc<dyn EventSink>,
    running: AtomicBool,
}

impl Shared {
    #[instrument(skip(self))]
    async fn tick(&self) -> TickOutcome {
        let mut engine = self.engine.lock().await;
        let config = self.config.current();

        let enumerated = tokio::time::timeout(config.enumerate_timeout(), self.provider.enumerate())
            .await
            .unwrap_or_else(|_| Err(ProviderError::Timeout(config.enumerate_timeout())));

        let snapshots = match enumerated {
            Ok(snapshots) => snapshots,
            Err(e) => {
                warn!(error = %e, "Skipping tick, players unavailable");
                return TickOutcome::Skipped(e);
            }
        };

        let players: Vec<Player> = snapshots
            .into_iter()
            .map(|snapshot| Player::from_snapshot(snapshot, &config))
            .collect();

        let result = engine.tick(players, &config, self.provider.as_ref()).await;

        if let Some(event) = &result.now_playing {
            self.sink.on_now_playing(event);
        }
        self.sink.on_state_changed(&result);

        TickOutcome::Completed(result)
    }
}

/// Runs the engine on a fixed cadence.
///
/// Ticks never overlap: the loop and direct [`tick`](Self::tick) calls share
/// one lock around the engine, held until the tick's commands have been
/// delivered and its events published.
pub struct PollDriver {
    shared: Arc<Shared>,
    stop_tx: Mutex<Option<watch::Sender<bool>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl PollDriver {
    /// Create a stopped driver owning `engine`.
    pub fn new(
        engine: Engine,
        provider: Arc<dyn PlayerProvider>,
        config: Arc<dyn ConfigSource>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                engine: tokio::sync::Mutex::new(engine),
                provider,
                config,
                sink,
                running: AtomicBool::new(false),
            }),
            stop_tx: Mutex::new(None),
            task: Mutex::new(None),
        }
    }

    /// Starts the poll loop on the current tokio runtime.
    ///
    /// Does nothing when the loop is already running.
    pub fn start(&self) {
        if self.shared.running.swap(true, Ordering::SeqCst) {
            debug!("Poll loop already running");
            return;
        }

        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(run_loop(Arc::clone(&self.shared), stop_rx));

        *self.stop_tx.lock().unwrap_or_else(PoisonError::into_inner) = Some(stop_tx);
        *self.task.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
        info!("MediaSense monitoring started");
    }

    /// Stops scheduling new ticks. A tick in flight still completes.
    pub fn stop(&self) {
        if !self.shared.running.swap(false, Ordering::SeqCst) {
            return;
        }

        if let Some(stop_tx) = self
            .stop_tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            let _ = stop_tx.send(true);
        }
        info!("MediaSense monitoring stopped");
    }

    /// Stops the loop and waits for an in-flight tick to finish.
    pub async fn shutdown(&self) {
        self.stop();

        let handle = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(handle) = handle
            && let Err(e) = handle.await
        {
            warn!(error = %e, "Poll loop ended abnormally");
        }
    }

    /// Whether the poll loop is scheduled.
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    /// Runs one tick now, waiting for any tick in flight to finish first.
    pub async fn tick(&self) -> TickOutcome {
        self.shared.tick().await
    }

    /// Runs `f` against the engine between ticks.
    pub async fn with_engine<R>(&self, f: impl FnOnce(&Engine) -> R) -> R {
        let engine = self.shared.engine.lock().await;
        f(&engine)
    }
}

impl Drop for PollDriver {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_loop(shared: Arc<Shared>, mut stop_rx: watch::Receiver<bool>) {
    let mut consecutive_failures: u32 = 0;

    loop {
        if *stop_rx.borrow() {
            break;
        }

        let outcome = shared.tick().await;
        let config = shared.config.current();

        let delay = match outcome {
            TickOutcome::Completed(_) => {
                consecutive_failures = 0;
                config.poll_interval()
            }
            TickOutcome::Skipped(_) => {
                consecutive_failures = consecutive_failures.saturating_add(1);
                let delay = backoff_delay(&config, consecutive_failures);
                debug!(consecutive_failures, ?delay, "Backing off after failed enumeration");
                delay
            }
        };

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            changed = stop_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    debug!("Poll loop exited");
}

/// Cooldown after `failures` consecutive failed enumerations.
///
/// The first failure waits `error_backoff_factor` poll intervals; every
/// further failure doubles that, up to `max_backoff`.
pub fn backoff_delay(config: &ArbitrationConfig, failures: u32) -> Duration {
    if failures == 0 {
        return config.poll_interval();
    }

    let base = config
        .poll_interval()
        .saturating_mul(config.error_backoff_factor);
    let doublings = (failures - 1).min(16);
    let widened = base.saturating_mul(1 << doublings);

    widened.min(config.max_backoff()).max(config.poll_interval())
}
