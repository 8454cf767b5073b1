//! Behavior tests for price streams and the registry that owns them.
//!
//! Time is paused: sleeps complete instantly once every task is idle, so the
//! poll interval is observed without real waiting.

mod support;

use std::sync::Arc;
use std::time::Duration;

use quotewatch_core::{
    PriceTick, StreamHandle, StreamQuota, StreamRegistry, StreamSettings, StreamState, Symbol,
    TickValue,
};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::time::Instant;

use support::{fmp_profile, ok, status, Harness, ScriptedHttpClient};

const INTERVAL: Duration = Duration::from_secs(5);

fn symbol(raw: &str) -> Symbol {
    Symbol::parse(raw).expect("valid symbol")
}

fn settings(quota: StreamQuota) -> StreamSettings {
    StreamSettings {
        interval: INTERVAL,
        quota,
    }
}

fn registry(harness: &Harness, quota: StreamQuota) -> StreamRegistry {
    StreamRegistry::new(harness.client.clone(), settings(quota))
}

fn apple(price: f64) -> String {
    fmp_profile("AAPL", "Apple Inc.", price, 0.5)
}

async fn next_tick(rx: &mut broadcast::Receiver<PriceTick>) -> PriceTick {
    tokio::time::timeout(Duration::from_secs(60), rx.recv())
        .await
        .expect("tick should arrive")
        .expect("channel should stay open")
}

fn drain(rx: &mut broadcast::Receiver<PriceTick>) -> usize {
    let mut drained = 0;
    while rx.try_recv().is_ok() {
        drained += 1;
    }
    drained
}

async fn wait_for_state(handle: &StreamHandle, wanted: StreamState) {
    let mut states = handle.watch_state();
    tokio::time::timeout(Duration::from_secs(60), states.wait_for(|s| *s == wanted))
        .await
        .expect("state should be reached")
        .expect("state channel should stay open");
}

// =============================================================================
// Registry: Start Semantics
// =============================================================================

#[tokio::test(start_paused = true)]
async fn starting_a_symbol_twice_yields_one_active_stream() {
    let harness = Harness::new(ScriptedHttpClient::always_json(&apple(150.0)), 250);
    let registry = registry(&harness, StreamQuota::Metered);

    let first = registry.start(&symbol("AAPL"));
    let second = registry.start(&symbol("aapl"));

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.active_symbols(), vec![symbol("AAPL")]);

    registry.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn streams_for_different_symbols_are_independent() {
    let harness = Harness::new(
        ScriptedHttpClient::always_json(&fmp_profile("MSFT", "Microsoft", 400.0, 0.1)),
        250,
    );
    let registry = registry(&harness, StreamQuota::Unmetered);

    let aapl = registry.start(&symbol("AAPL"));
    let msft = registry.start(&symbol("MSFT"));
    assert!(!Arc::ptr_eq(&aapl, &msft));
    assert_eq!(registry.active_symbols(), vec![symbol("AAPL"), symbol("MSFT")]);

    assert!(registry.stop(&symbol("AAPL")).await);
    assert!(msft.is_running());
    assert_eq!(aapl.state(), StreamState::Idle);

    registry.shutdown().await;
}

// =============================================================================
// PriceStream: Emission Cadence
// =============================================================================

#[tokio::test(start_paused = true)]
async fn stream_emits_sequential_ticks_one_interval_apart() {
    let harness = Harness::new(
        ScriptedHttpClient::sequence(vec![ok(&apple(150.0)), ok(&apple(151.0))], ok(&apple(152.0))),
        250,
    );
    let registry = registry(&harness, StreamQuota::Metered);
    let handle = registry.start(&symbol("AAPL"));
    let mut rx = handle.subscribe();
    let started = Instant::now();

    let first = next_tick(&mut rx).await;
    let second = next_tick(&mut rx).await;
    let third = next_tick(&mut rx).await;

    assert_eq!((first.seq, first.price()), (1, Some(150.0)));
    assert_eq!((second.seq, second.price()), (2, Some(151.0)));
    assert_eq!((third.seq, third.price()), (3, Some(152.0)));
    assert_eq!(third.symbol, symbol("AAPL"));
    assert!(started.elapsed() >= INTERVAL * 2);
    assert!(started.elapsed() < INTERVAL * 3);
    assert_eq!(harness.http.request_count(), 3);
    assert_eq!(handle.latest().map(|t| t.seq), Some(3));

    registry.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn late_subscribers_can_read_the_latest_tick() {
    let harness = Harness::new(ScriptedHttpClient::always_json(&apple(150.0)), 250);
    let registry = registry(&harness, StreamQuota::Metered);
    let handle = registry.start(&symbol("AAPL"));
    assert!(handle.latest().is_none());

    tokio::time::sleep(INTERVAL + Duration::from_secs(1)).await;

    let latest = handle.latest().expect("a tick should have been recorded");
    assert_eq!(latest.seq, 2);
    assert_eq!(latest.value, TickValue::Price(150.0));

    registry.shutdown().await;
}

// =============================================================================
// PriceStream: Failures
// =============================================================================

#[tokio::test(start_paused = true)]
async fn transient_failures_emit_unavailable_and_keep_running() {
    let harness = Harness::new(
        ScriptedHttpClient::sequence(vec![status(500), ok("[]")], ok(&apple(150.0))),
        250,
    );
    let registry = registry(&harness, StreamQuota::Metered);
    let handle = registry.start(&symbol("AAPL"));
    let mut rx = handle.subscribe();

    let first = next_tick(&mut rx).await;
    let second = next_tick(&mut rx).await;
    let third = next_tick(&mut rx).await;

    assert!(matches!(first.value, TickValue::Unavailable(ref reason) if reason.contains("500")));
    assert!(!second.is_available());
    assert_eq!(third.price(), Some(150.0));
    assert_eq!(handle.state(), StreamState::Running);

    registry.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn rejected_credential_faults_the_stream_and_restart_replaces_it() {
    let harness = Harness::new(ScriptedHttpClient::always(status(401)), 250);
    let registry = registry(&harness, StreamQuota::Metered);
    let handle = registry.start(&symbol("AAPL"));
    let mut rx = handle.subscribe();

    let tick = next_tick(&mut rx).await;
    wait_for_state(&handle, StreamState::Faulted).await;

    assert!(!tick.is_available());
    tokio::time::sleep(INTERVAL * 4).await;
    assert_eq!(harness.http.request_count(), 1);
    assert!(registry.active_symbols().is_empty());

    let restarted = registry.start(&symbol("AAPL"));
    assert!(!Arc::ptr_eq(&handle, &restarted));
    assert_eq!(registry.len(), 1);

    registry.shutdown().await;
}

// =============================================================================
// PriceStream: Quota Policy
// =============================================================================

#[tokio::test(start_paused = true)]
async fn metered_stream_emits_unavailable_once_quota_is_spent() {
    let harness = Harness::new(ScriptedHttpClient::always_json(&apple(150.0)), 2);
    let registry = registry(&harness, StreamQuota::Metered);
    let handle = registry.start(&symbol("AAPL"));
    let mut rx = handle.subscribe();

    let ticks = [
        next_tick(&mut rx).await,
        next_tick(&mut rx).await,
        next_tick(&mut rx).await,
    ];

    assert!(ticks[0].is_available());
    assert!(ticks[1].is_available());
    assert!(
        matches!(ticks[2].value, TickValue::Unavailable(ref reason) if reason.contains("try again tomorrow"))
    );
    assert_eq!(handle.state(), StreamState::Running);
    assert_eq!(harness.http.request_count(), 2);

    // A new day restores the stream without a restart.
    harness.clock.advance_days(1);
    assert!(next_tick(&mut rx).await.is_available());

    registry.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn unmetered_stream_bypasses_the_daily_counter() {
    let harness = Harness::new(ScriptedHttpClient::always_json(&apple(150.0)), 0);
    let registry = registry(&harness, StreamQuota::Unmetered);
    let handle = registry.start(&symbol("AAPL"));
    let mut rx = handle.subscribe();

    for _ in 0..3 {
        assert_eq!(next_tick(&mut rx).await.price(), Some(150.0));
    }
    assert_eq!(harness.limiter.used_today(), 0);
    assert_eq!(harness.client.search("AAPL").await, None);

    registry.shutdown().await;
}

// =============================================================================
// Teardown
// =============================================================================

#[tokio::test(start_paused = true)]
async fn no_tick_is_emitted_after_stop_returns() {
    let harness = Harness::new(ScriptedHttpClient::always_json(&apple(150.0)), 250);
    let registry = registry(&harness, StreamQuota::Metered);
    let handle = registry.start(&symbol("AAPL"));
    let mut rx = handle.subscribe();
    next_tick(&mut rx).await;

    assert!(registry.stop(&symbol("AAPL")).await);
    drain(&mut rx);
    let requests_at_stop = harness.http.request_count();

    tokio::time::sleep(INTERVAL * 10).await;

    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    assert_eq!(harness.http.request_count(), requests_at_stop);
    assert_eq!(handle.state(), StreamState::Idle);
    assert!(!registry.contains(&symbol("AAPL")));
}

#[tokio::test(start_paused = true)]
async fn stop_during_an_in_flight_fetch_discards_its_result() {
    let harness = Harness::new(
        ScriptedHttpClient::always_json(&apple(150.0)).with_latency(Duration::from_secs(3)),
        250,
    );
    let registry = registry(&harness, StreamQuota::Metered);
    let handle = registry.start(&symbol("AAPL"));
    let mut rx = handle.subscribe();

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(harness.http.request_count(), 1);
    registry.stop(&symbol("AAPL")).await;
    tokio::time::sleep(Duration::from_secs(30)).await;

    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    assert!(handle.latest().is_none());
}

#[tokio::test(start_paused = true)]
async fn stopping_an_unknown_symbol_is_a_no_op() {
    let harness = Harness::new(ScriptedHttpClient::always_json(&apple(150.0)), 250);
    let registry = registry(&harness, StreamQuota::Metered);

    assert!(!registry.stop(&symbol("AAPL")).await);
    assert!(registry.is_empty());
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_every_stream() {
    let harness = Harness::new(ScriptedHttpClient::always_json(&apple(150.0)), 250);
    let registry = registry(&harness, StreamQuota::Unmetered);
    let handles = [
        registry.start(&symbol("AAPL")),
        registry.start(&symbol("MSFT")),
        registry.start(&symbol("TSLA")),
    ];

    registry.shutdown().await;

    assert!(registry.is_empty());
    for handle in &handles {
        assert_eq!(handle.state(), StreamState::Idle, "{}", handle.symbol());
    }
}

#[tokio::test(start_paused = true)]
async fn dropping_the_registry_cancels_outstanding_streams() {
    let harness = Harness::new(ScriptedHttpClient::always_json(&apple(150.0)), 250);
    let registry = registry(&harness, StreamQuota::Metered);
    let handle = registry.start(&symbol("AAPL"));
    let mut rx = handle.subscribe();
    next_tick(&mut rx).await;

    drop(registry);
    wait_for_state(&handle, StreamState::Cancelled).await;
    drain(&mut rx);
    let requests_at_cancel = harness.http.request_count();

    tokio::time::sleep(INTERVAL * 10).await;
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    assert_eq!(harness.http.request_count(), requests_at_cancel);
}
