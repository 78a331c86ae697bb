mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use common::{alert, ScriptedBoundary};
use nexus_console::{RemoteBoundary, SyncConfig, SyncOrchestrator};

fn build(boundary: &Arc<ScriptedBoundary>) -> Arc<SyncOrchestrator> {
    let boundary: Arc<dyn RemoteBoundary> = boundary.clone();
    SyncOrchestrator::new(boundary, SyncConfig::default())
}

#[tokio::test]
async fn unread_count_tracks_the_latest_full_fetch() {
    let boundary = Arc::new(ScriptedBoundary::new());
    boundary.set_alerts(vec![alert(1, false), alert(2, false)]).await;

    let orchestrator = build(&boundary);
    assert_eq!(orchestrator.unread_count().await, 0, "nothing fetched yet");

    orchestrator.alert_tick().await;
    assert_eq!(orchestrator.unread_count().await, 2);

    orchestrator
        .mark_alert_read(1)
        .await
        .expect("mark-read should succeed");
    // The mutation refetched the unread set; the count is derived from it.
    assert_eq!(orchestrator.unread_count().await, 1);
}

#[tokio::test]
async fn mark_all_read_then_tick_reports_zero() {
    let boundary = Arc::new(ScriptedBoundary::new());
    boundary.set_alerts(vec![alert(1, false), alert(2, false)]).await;

    let orchestrator = build(&boundary);
    orchestrator.alert_tick().await;
    assert_eq!(orchestrator.unread_count().await, 2);

    orchestrator
        .mark_all_alerts_read()
        .await
        .expect("mark-all should succeed");
    assert_eq!(orchestrator.unread_count().await, 0);

    orchestrator.alert_tick().await;
    assert_eq!(orchestrator.unread_count().await, 0);
}

#[tokio::test]
async fn alert_arriving_after_mark_all_is_counted_on_the_next_tick() {
    let boundary = Arc::new(ScriptedBoundary::new());
    boundary.set_alerts(vec![alert(1, false)]).await;

    let orchestrator = build(&boundary);
    orchestrator.alert_tick().await;
    orchestrator
        .mark_all_alerts_read()
        .await
        .expect("mark-all should succeed");
    assert_eq!(orchestrator.unread_count().await, 0);

    // A strictly-newer alert lands on the backend after the mark call.
    boundary.add_alert(alert(99, false)).await;
    orchestrator.alert_tick().await;
    assert_eq!(orchestrator.unread_count().await, 1);
}

#[tokio::test]
async fn overlapping_ticks_are_skipped_not_queued() {
    let boundary = Arc::new(ScriptedBoundary::new());
    boundary.set_alerts(vec![alert(1, false)]).await;
    let release = boundary.gate_next_alerts().await;

    let orchestrator = build(&boundary);

    let first = Arc::clone(&orchestrator);
    let blocked_tick = tokio::spawn(async move { first.alert_tick().await });
    tokio::time::sleep(Duration::from_millis(50)).await;

    // The overlapping tick returns immediately without a backend call.
    orchestrator.alert_tick().await;
    assert_eq!(boundary.calls.unread_alerts.load(Ordering::SeqCst), 1);

    release.send(()).expect("gate receiver should be alive");
    blocked_tick.await.expect("tick task should not panic");

    assert_eq!(boundary.calls.unread_alerts.load(Ordering::SeqCst), 1);
    assert_eq!(orchestrator.unread_count().await, 1);
}

#[tokio::test]
async fn failed_tick_keeps_the_previous_unread_set_and_recovers() {
    let boundary = Arc::new(ScriptedBoundary::new());
    boundary.set_alerts(vec![alert(1, false), alert(2, false)]).await;

    let orchestrator = build(&boundary);
    orchestrator.alert_tick().await;
    assert_eq!(orchestrator.unread_count().await, 2);

    boundary.fail_next_alerts().await;
    orchestrator.alert_tick().await;
    // Stale-but-available: the count still reflects the last good fetch,
    // and the error is visible on the snapshot.
    assert_eq!(orchestrator.unread_count().await, 2);
    assert!(orchestrator.alerts_snapshot().await.error.is_some());

    orchestrator.alert_tick().await;
    assert_eq!(orchestrator.unread_count().await, 2);
    assert!(orchestrator.alerts_snapshot().await.error.is_none());
}
