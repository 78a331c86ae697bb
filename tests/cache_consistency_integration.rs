mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use common::{device, ScriptedBoundary};
use nexus_console::{RemoteBoundary, RemoteError, SyncConfig, SyncOrchestrator};

fn build(boundary: &Arc<ScriptedBoundary>) -> Arc<SyncOrchestrator> {
    let boundary: Arc<dyn RemoteBoundary> = boundary.clone();
    SyncOrchestrator::new(boundary, SyncConfig::default())
}

#[tokio::test]
async fn concurrent_fetches_coalesce_into_one_backend_call() {
    let boundary = Arc::new(ScriptedBoundary::new());
    boundary
        .set_devices(vec![device(1, "AA:BB:CC:DD:EE:01")])
        .await;
    let release = boundary.gate_next_devices().await;

    let orchestrator = build(&boundary);

    let first = Arc::clone(&orchestrator);
    let task_one = tokio::spawn(async move { first.fetch_devices().await });
    let second = Arc::clone(&orchestrator);
    let task_two = tokio::spawn(async move { second.fetch_devices().await });

    // Let both callers reach the cache while the backend call is blocked.
    tokio::time::sleep(Duration::from_millis(50)).await;
    release.send(()).expect("gate receiver should be alive");

    let devices_one = task_one
        .await
        .expect("task should not panic")
        .expect("fetch should succeed");
    let devices_two = task_two
        .await
        .expect("task should not panic")
        .expect("fetch should succeed");

    assert_eq!(devices_one.len(), 1);
    assert_eq!(devices_two.len(), 1);
    assert_eq!(
        boundary.calls.devices.load(Ordering::SeqCst),
        1,
        "coalesced fetches must issue exactly one backend call"
    );
}

#[tokio::test]
async fn stale_response_does_not_overwrite_newer_result() {
    let boundary = Arc::new(ScriptedBoundary::new());
    // Request #1 blocks and will return the EE:01 list; request #2 is
    // unblocked and returns the EE:02 list first.
    let release = boundary.gate_next_devices().await;
    boundary
        .queue_devices_response(vec![device(1, "AA:BB:CC:DD:EE:01")])
        .await;
    boundary
        .queue_devices_response(vec![device(2, "AA:BB:CC:DD:EE:02")])
        .await;

    let orchestrator = build(&boundary);

    let first = Arc::clone(&orchestrator);
    let stale_task = tokio::spawn(async move { first.fetch_devices().await });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let fresh = orchestrator
        .invalidate_devices()
        .await
        .expect("forced refetch should succeed");
    assert_eq!(fresh[0].mac, "AA:BB:CC:DD:EE:02");

    // Now let the older response land; it must be discarded.
    release.send(()).expect("gate receiver should be alive");
    let stale_result = stale_task
        .await
        .expect("task should not panic")
        .expect("superseded fetch resolves to the applied value");
    assert_eq!(stale_result[0].mac, "AA:BB:CC:DD:EE:02");

    let snapshot = orchestrator.devices_snapshot().await;
    let cached = snapshot.value.expect("cache should hold a value");
    assert_eq!(cached[0].mac, "AA:BB:CC:DD:EE:02");
    assert_eq!(boundary.calls.devices.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn rename_round_trips_through_refetch() {
    let boundary = Arc::new(ScriptedBoundary::new());
    boundary
        .set_devices(vec![device(1, "AA:BB:CC:DD:EE:01")])
        .await;

    let orchestrator = build(&boundary);
    let before = orchestrator.fetch_devices().await.expect("initial fetch");
    assert!(before[0].custom_name.is_none());
    assert_eq!(boundary.calls.devices.load(Ordering::SeqCst), 1);

    orchestrator
        .rename_device("aa:bb:cc:dd:ee:01", "nas")
        .await
        .expect("rename should succeed");

    // The mutation invalidated the cache; the refetch carries the name.
    assert_eq!(boundary.calls.devices.load(Ordering::SeqCst), 2);
    let snapshot = orchestrator.devices_snapshot().await;
    let cached = snapshot.value.expect("cache should hold a value");
    assert_eq!(cached[0].custom_name.as_deref(), Some("nas"));
}

#[tokio::test]
async fn failed_mutation_leaves_cache_untouched() {
    let boundary = Arc::new(ScriptedBoundary::new());
    boundary
        .set_devices(vec![device(1, "AA:BB:CC:DD:EE:01")])
        .await;

    let orchestrator = build(&boundary);
    orchestrator.fetch_devices().await.expect("initial fetch");

    let err = orchestrator
        .rename_device("AA:BB:CC:DD:EE:99", "ghost")
        .await
        .expect_err("renaming an unknown device must fail");
    assert!(matches!(err, RemoteError::Rejected(_)));

    // No invalidation on failure: still exactly one devices fetch.
    assert_eq!(boundary.calls.devices.load(Ordering::SeqCst), 1);
    let snapshot = orchestrator.devices_snapshot().await;
    assert!(snapshot.error.is_none());
    let cached = snapshot.value.expect("cache should hold a value");
    assert!(cached[0].custom_name.is_none());
}

#[tokio::test]
async fn invalid_mac_is_rejected_before_reaching_the_backend() {
    let boundary = Arc::new(ScriptedBoundary::new());
    let orchestrator = build(&boundary);

    let err = orchestrator
        .rename_device("not-a-mac", "whatever")
        .await
        .expect_err("malformed MAC must be rejected");
    assert!(matches!(err, RemoteError::Rejected(_)));
    assert_eq!(boundary.calls.update_name.load(Ordering::SeqCst), 0);
}
