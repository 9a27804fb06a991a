use std::{sync::Arc, time::Duration};

use futures::StreamExt;
use tokio::sync::broadcast::error::TryRecvError;

use crate::arbitration::{
    ChannelSink, Command, CommandError, Engine, EngineEvent, MemoryProvider, PlayerId,
    PollDriver, ProviderError, TickOutcome, TracingSink, backoff_delay,
};
use crate::config::ArbitrationConfig;
use crate::config_store::ConfigStore;

use super::{Paused, Playing, snapshots};

fn provider() -> Arc<MemoryProvider> {
    Arc::new(MemoryProvider::new(snapshots(&[
        ("firefox.1", Playing),
        ("spotify.1", Playing),
    ])))
}

fn driver_with(provider: &Arc<MemoryProvider>, sink: Arc<ChannelSink>) -> PollDriver {
    PollDriver::new(
        Engine::new(),
        provider.clone(),
        Arc::new(ArbitrationConfig::default()),
        sink,
    )
}

#[tokio::test(start_paused = true)]
async fn start_twice_runs_a_single_loop() {
    let provider = provider();
    let driver = driver_with(&provider, Arc::new(ChannelSink::default()));

    driver.start();
    driver.start();
    assert!(driver.is_running());

    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(provider.enumerations(), 3);

    driver.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn stop_prevents_further_ticks() {
    let provider = provider();
    let driver = driver_with(&provider, Arc::new(ChannelSink::default()));

    driver.start();
    tokio::time::sleep(Duration::from_millis(1500)).await;
    driver.shutdown().await;
    assert!(!driver.is_running());

    let seen = provider.enumerations();
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(provider.enumerations(), seen);

    // Stopping twice is harmless.
    driver.stop();
}

#[tokio::test(start_paused = true)]
async fn restart_after_stop_resumes_polling() {
    let provider = provider();
    let driver = driver_with(&provider, Arc::new(ChannelSink::default()));

    driver.start();
    driver.shutdown().await;
    let seen = provider.enumerations();

    driver.start();
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert!(provider.enumerations() > seen);

    driver.shutdown().await;
}

#[tokio::test]
async fn failed_enumeration_skips_tick_without_side_effects() {
    let provider = provider();
    let sink = Arc::new(ChannelSink::default());
    let mut rx = sink.subscribe();
    let driver = driver_with(&provider, sink);

    provider.fail_next_enumerations(1);
    let outcome = driver.tick().await;

    assert_eq!(
        outcome,
        TickOutcome::Skipped(ProviderError::Unavailable("injected failure".to_string()))
    );
    assert!(outcome.result().is_none());
    assert!(provider.issued().is_empty());
    assert_eq!(driver.with_engine(|e| e.state().tick_count()).await, 0);
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

    let outcome = driver.tick().await;
    assert_eq!(outcome.result().map(|r| r.tick), Some(1));
}

#[tokio::test(start_paused = true)]
async fn stalled_enumeration_times_out() {
    let provider = provider();
    let driver = driver_with(&provider, Arc::new(ChannelSink::default()));

    provider.stall_enumeration(true);
    let outcome = driver.tick().await;

    assert_eq!(
        outcome,
        TickOutcome::Skipped(ProviderError::Timeout(Duration::from_millis(5000)))
    );
}

#[tokio::test(start_paused = true)]
async fn repeated_failures_back_off() {
    let provider = provider();
    let driver = driver_with(&provider, Arc::new(ChannelSink::default()));
    provider.fail_next_enumerations(2);

    driver.start();

    // Failures at 0s and 5s, success at 15s, then regular polling.
    tokio::time::sleep(Duration::from_millis(4500)).await;
    assert_eq!(provider.enumerations(), 1);

    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert_eq!(provider.enumerations(), 2);

    tokio::time::sleep(Duration::from_millis(9000)).await;
    assert_eq!(provider.enumerations(), 2);

    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert_eq!(provider.enumerations(), 3);

    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert_eq!(provider.enumerations(), 4);

    driver.shutdown().await;
}

#[test]
fn backoff_grows_to_ceiling() {
    let config = ArbitrationConfig::default();

    assert_eq!(backoff_delay(&config, 0), Duration::from_secs(1));
    assert_eq!(backoff_delay(&config, 1), Duration::from_secs(5));
    assert_eq!(backoff_delay(&config, 2), Duration::from_secs(10));
    assert_eq!(backoff_delay(&config, 3), Duration::from_secs(20));
    assert_eq!(backoff_delay(&config, 4), Duration::from_secs(40));
    assert_eq!(backoff_delay(&config, 5), Duration::from_secs(60));
    assert_eq!(backoff_delay(&config, u32::MAX), Duration::from_secs(60));
}

#[test]
fn backoff_never_shorter_than_poll_interval() {
    let config = ArbitrationConfig {
        error_backoff_factor: 1,
        max_backoff_ms: 1000,
        ..Default::default()
    };

    assert_eq!(backoff_delay(&config, 7), Duration::from_secs(1));
}

fn spotify() -> PlayerId {
    PlayerId::new("spotify.1")
}

#[tokio::test(start_paused = true)]
async fn stop_lets_the_tick_in_flight_finish() {
    let provider = provider();
    provider.stall_commands_for(&spotify());
    let sink = Arc::new(ChannelSink::default());
    let mut rx = sink.subscribe();
    let driver = driver_with(&provider, sink);

    driver.start();
    tokio::time::sleep(Duration::from_millis(100)).await;

    // The pause is still waiting on the player.
    assert_eq!(provider.issued(), vec![Command::pause(spotify())]);
    driver.stop();
    assert!(!driver.is_running());

    driver.shutdown().await;

    assert_eq!(driver.with_engine(|e| e.state().tick_count()).await, 1);
    assert_eq!(provider.enumerations(), 1);

    let mut results = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let EngineEvent::StateChanged(result) = event {
            results.push(result);
        }
    }
    assert_eq!(results.len(), 1);
    let failures: Vec<_> = results[0].failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(
        failures[0].outcome,
        Err(CommandError::Timeout {
            player: spotify(),
            after: Duration::from_millis(2000),
        })
    );
}

#[tokio::test(start_paused = true)]
async fn second_tick_waits_for_first_ticks_commands() {
    let provider = provider();
    provider.stall_commands_for(&spotify());
    let driver = driver_with(&provider, Arc::new(ChannelSink::default()));

    let first = driver.tick();
    let second = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        driver.tick().await
    };
    // Midway through the first tick's stalled pause.
    let observer = async {
        tokio::time::sleep(Duration::from_millis(1000)).await;
        provider.enumerations()
    };

    let (first, second, enumerations_mid_tick) = tokio::join!(first, second, observer);

    assert_eq!(enumerations_mid_tick, 1);
    assert_eq!(provider.enumerations(), 2);

    let first = first.result().unwrap();
    let second = second.result().unwrap();
    assert_eq!((first.tick, second.tick), (1, 2));
    assert_eq!(first.failures().count(), 1);

    // The second tick saw the first one's timeout and retried the pause.
    assert_eq!(
        provider.issued(),
        vec![Command::pause(spotify()), Command::pause(spotify())]
    );
}

#[tokio::test]
async fn events_arrive_in_tick_order() {
    let provider = provider();
    let sink = Arc::new(ChannelSink::default());
    let mut rx = sink.subscribe();
    let driver = driver_with(&provider, sink);

    driver.tick().await;
    driver.tick().await;

    match rx.try_recv().unwrap() {
        EngineEvent::NowPlaying(event) => assert_eq!(event.player_id, PlayerId::new("firefox.1")),
        other => panic!("expected now playing, got {other:?}"),
    }
    match rx.try_recv().unwrap() {
        EngineEvent::StateChanged(result) => assert_eq!(result.tick, 1),
        other => panic!("expected state change, got {other:?}"),
    }
    match rx.try_recv().unwrap() {
        EngineEvent::StateChanged(result) => {
            assert_eq!(result.tick, 2);
            assert!(result.commands.is_empty());
        }
        other => panic!("expected state change, got {other:?}"),
    }
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn event_stream_yields_published_events() {
    let provider = provider();
    let sink = Arc::new(ChannelSink::default());
    let mut events = Box::pin(sink.events());
    let driver = driver_with(&provider, sink);

    driver.tick().await;

    assert!(matches!(events.next().await, Some(EngineEvent::NowPlaying(_))));
    assert!(matches!(events.next().await, Some(EngineEvent::StateChanged(_))));
}

#[tokio::test]
async fn config_changes_apply_on_next_tick() {
    let provider = Arc::new(MemoryProvider::new(snapshots(&[
        ("firefox.1", Paused),
        ("spotify.1", Playing),
    ])));
    let store = ConfigStore::with_defaults();
    let driver = PollDriver::new(
        Engine::new(),
        provider.clone(),
        Arc::new(store.clone()),
        Arc::new(TracingSink),
    );

    driver.tick().await;
    assert!(provider.issued().is_empty());

    store
        .update_arbitration(|config| config.pause_all_enabled = true)
        .unwrap();
    let outcome = driver.tick().await;

    assert!(outcome.result().unwrap().pause_all);
    assert_eq!(
        provider.issued(),
        vec![Command::pause(PlayerId::new("spotify.1"))]
    );
}
