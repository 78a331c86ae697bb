use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::app::{AppContext, WatchSummary};
use crate::models::{AlertRecord, DeviceRecord, NetworkStats, ScanRecord};
use crate::sync::{FeedEntry, NetworkEvent, SessionState, SyncOrchestrator};

/// How often `watch` drains the feed for display. Independent of the
/// session poll cadence, which tracks the monitoring interval.
const WATCH_DRAIN_PERIOD: Duration = Duration::from_millis(500);

fn build_orchestrator(context: &AppContext) -> Result<Arc<SyncOrchestrator>> {
    Ok(SyncOrchestrator::new(
        context.boundary()?,
        context.sync_config().clone(),
    ))
}

pub(crate) async fn handle_status(context: &AppContext) -> Result<NetworkStats> {
    let orchestrator = build_orchestrator(context)?;
    orchestrator
        .fetch_stats()
        .await
        .context("Failed to fetch network stats")
}

pub(crate) async fn handle_devices(context: &AppContext) -> Result<Vec<DeviceRecord>> {
    let orchestrator = build_orchestrator(context)?;
    orchestrator
        .fetch_devices()
        .await
        .context("Failed to fetch devices")
}

pub(crate) async fn handle_history(limit: u32, context: &AppContext) -> Result<Vec<ScanRecord>> {
    let orchestrator = build_orchestrator(context)?;
    let mut history = orchestrator
        .fetch_history()
        .await
        .context("Failed to fetch scan history")?;
    // The cache fetches at its configured limit; trim for display.
    history.truncate(limit as usize);
    Ok(history)
}

pub(crate) async fn handle_alerts(context: &AppContext) -> Result<Vec<AlertRecord>> {
    let orchestrator = build_orchestrator(context)?;
    orchestrator
        .fetch_alerts()
        .await
        .context("Failed to fetch unread alerts")
}

pub(crate) async fn handle_rename(
    mac: &str,
    name: &str,
    context: &AppContext,
) -> Result<(String, String)> {
    let normalized = crate::models::normalize_mac(mac)
        .with_context(|| format!("Invalid MAC address: {}", mac))?;
    let orchestrator = build_orchestrator(context)?;
    orchestrator
        .rename_device(&normalized, name)
        .await
        .with_context(|| format!("Failed to rename device {}", normalized))?;
    Ok((normalized, name.to_string()))
}

pub(crate) async fn handle_mark_read(alert_id: i64, context: &AppContext) -> Result<usize> {
    let orchestrator = build_orchestrator(context)?;
    orchestrator
        .mark_alert_read(alert_id)
        .await
        .with_context(|| format!("Failed to mark alert {} read", alert_id))?;
    Ok(orchestrator.unread_count().await)
}

pub(crate) async fn handle_mark_all_read(context: &AppContext) -> Result<usize> {
    let orchestrator = build_orchestrator(context)?;
    orchestrator
        .mark_all_alerts_read()
        .await
        .context("Failed to mark all alerts read")?;
    Ok(orchestrator.unread_count().await)
}

/// Run a monitoring session, streaming feed events until it completes or
/// the user cancels.
pub(crate) async fn handle_watch(interval: u64, context: &AppContext) -> Result<WatchSummary> {
    let orchestrator = build_orchestrator(context)?;
    orchestrator.start().await;
    orchestrator
        .start_monitoring(interval)
        .await
        .context("Failed to start monitoring")?;

    let mut events_seen = 0usize;
    let mut completed = false;

    loop {
        for entry in orchestrator.drain_feed() {
            events_seen += 1;
            context.emit_line(&format_feed_entry(&entry));
        }

        if context.is_cancelled() {
            match orchestrator.stop_monitoring().await {
                Ok(outcome) => completed = outcome.completed,
                Err(err) => tracing::warn!("Stop request failed: {}", err),
            }
            break;
        }

        match orchestrator.session_state().await {
            SessionState::Idle => {
                completed = true;
                break;
            }
            SessionState::Error => break,
            _ => {}
        }

        tokio::time::sleep(WATCH_DRAIN_PERIOD).await;
    }

    for entry in orchestrator.drain_feed() {
        events_seen += 1;
        context.emit_line(&format_feed_entry(&entry));
    }

    let status = orchestrator.monitoring_status().await;
    orchestrator.dispose().await;

    Ok(WatchSummary {
        completed,
        cancelled: context.is_cancelled(),
        scan_count: status.scan_count,
        events_seen,
    })
}

/// Render one feed entry for the terminal. The only place event kinds are
/// turned into text; the core never formats.
fn format_feed_entry(entry: &FeedEntry) -> String {
    let stamp = entry.received_at.format("%H:%M:%S");
    match &entry.event {
        NetworkEvent::MonitoringStarted { interval_seconds } => {
            format!("{} monitoring started (interval: {}s)", stamp, interval_seconds)
        }
        NetworkEvent::MonitoringStopped => format!("{} stop requested", stamp),
        NetworkEvent::PhaseChanged { phase } => format!("{} phase: {}", stamp, phase),
        NetworkEvent::PhaseRegression { previous, reported } => format!(
            "{} backend restarted its session (phase went {} -> {})",
            stamp, previous, reported
        ),
        NetworkEvent::ScanCycleCompleted {
            scan_count,
            hosts_online,
        } => format!(
            "{} scan cycle #{} complete ({} hosts online)",
            stamp, scan_count, hosts_online
        ),
        NetworkEvent::DevicesChanged { online, total } => {
            format!("{} devices: {}/{} online", stamp, online, total)
        }
        NetworkEvent::SessionCompleted { scan_count } => {
            format!("{} session completed after {} scan cycles", stamp, scan_count)
        }
        NetworkEvent::MonitoringError { message } => {
            format!("{} monitoring error: {}", stamp, message)
        }
    }
}
