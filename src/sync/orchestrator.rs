//! Sync orchestrator
//!
//! Owns the resource caches, the monitoring session, the event feed, and
//! the recurring timers, and keeps them consistent: mutations invalidate
//! their cache only after the backend accepts them, and a completed session
//! refreshes all four caches exactly once.

use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::config::{
    ALERT_POLL_INTERVAL, EVENT_FEED_CAPACITY, MAX_MONITOR_INTERVAL, MIN_MONITOR_INTERVAL,
    SCAN_HISTORY_LIMIT,
};
use crate::models::{normalize_mac, AlertRecord, DeviceRecord, NetworkStats, ScanRecord};
use crate::remote::{RemoteBoundary, RemoteError};
use crate::sync::cache::{CacheSnapshot, ResourceCache};
use crate::sync::events::{MonitoringStatus, NetworkEvent};
use crate::sync::feed::{EventFeed, FeedEntry};
use crate::sync::poller::AlertPoller;
use crate::sync::session::{EventCallback, MonitoringSession, PollOutcome, SessionState};
use crate::sync::task::RecurringTask;

/// Hook fired once per completed session, after the caches refresh
pub type CompletionCallback = Arc<dyn Fn() + Send + Sync>;

/// Tunables for one orchestrator instance. Defaults come from `config`.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub feed_capacity: usize,
    pub alert_poll_interval: Duration,
    pub history_limit: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            feed_capacity: EVENT_FEED_CAPACITY,
            alert_poll_interval: ALERT_POLL_INTERVAL,
            history_limit: SCAN_HISTORY_LIMIT,
        }
    }
}

#[derive(Default)]
struct Timers {
    session: Option<RecurringTask>,
    alerts: Option<RecurringTask>,
}

/// One consistent view over the backend for all console surfaces.
///
/// Surfaces share the orchestrator instance; none of the state inside is
/// meant to be duplicated per view.
pub struct SyncOrchestrator {
    boundary: Arc<dyn RemoteBoundary>,
    config: SyncConfig,
    stats: Arc<ResourceCache<NetworkStats>>,
    history: Arc<ResourceCache<Vec<ScanRecord>>>,
    devices: Arc<ResourceCache<Vec<DeviceRecord>>>,
    alerts: Arc<ResourceCache<Vec<AlertRecord>>>,
    session: Arc<MonitoringSession>,
    feed: Arc<StdMutex<EventFeed>>,
    poller: AlertPoller,
    completion: StdMutex<Option<CompletionCallback>>,
    timers: Mutex<Timers>,
}

fn lock_feed(feed: &StdMutex<EventFeed>) -> std::sync::MutexGuard<'_, EventFeed> {
    match feed.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl SyncOrchestrator {
    pub fn new(boundary: Arc<dyn RemoteBoundary>, config: SyncConfig) -> Arc<Self> {
        let feed = Arc::new(StdMutex::new(EventFeed::new(config.feed_capacity)));

        let feed_sink = Arc::clone(&feed);
        let events: EventCallback = Arc::new(move |event: NetworkEvent| {
            lock_feed(&feed_sink).push(event);
        });

        let stats_boundary = Arc::clone(&boundary);
        let stats = Arc::new(ResourceCache::new("stats", move || {
            let boundary = Arc::clone(&stats_boundary);
            async move { boundary.get_network_stats().await }
        }));

        let history_boundary = Arc::clone(&boundary);
        let history_limit = config.history_limit;
        let history = Arc::new(ResourceCache::new("history", move || {
            let boundary = Arc::clone(&history_boundary);
            async move { boundary.get_scan_history(history_limit).await }
        }));

        let devices_boundary = Arc::clone(&boundary);
        let devices = Arc::new(ResourceCache::new("devices", move || {
            let boundary = Arc::clone(&devices_boundary);
            async move { boundary.get_all_devices().await }
        }));

        let alerts_boundary = Arc::clone(&boundary);
        let alerts = Arc::new(ResourceCache::new("alerts", move || {
            let boundary = Arc::clone(&alerts_boundary);
            async move { boundary.get_unread_alerts().await }
        }));

        let session = Arc::new(MonitoringSession::new(Arc::clone(&boundary), events));
        let poller = AlertPoller::new(Arc::clone(&alerts));

        Arc::new(Self {
            boundary,
            config,
            stats,
            history,
            devices,
            alerts,
            session,
            feed,
            poller,
            completion: StdMutex::new(None),
            timers: Mutex::new(Timers::default()),
        })
    }

    /// Register the hook fired once per completed session.
    pub fn set_on_completion(&self, callback: CompletionCallback) {
        match self.completion.lock() {
            Ok(mut slot) => *slot = Some(callback),
            Err(poisoned) => *poisoned.into_inner() = Some(callback),
        }
    }

    /// Begin background work: the recurring alert poll. Idempotent.
    pub async fn start(self: &Arc<Self>) {
        let mut timers = self.timers.lock().await;
        if timers.alerts.is_none() {
            let this = Arc::clone(self);
            timers.alerts = Some(RecurringTask::spawn(
                "alert-poll",
                self.config.alert_poll_interval,
                move || {
                    let this = Arc::clone(&this);
                    async move {
                        this.alert_tick().await;
                    }
                },
            ));
        }
    }

    /// Release every timer. In-flight responses are discarded by the
    /// caches' sequence guards; nothing else needs teardown.
    pub async fn dispose(&self) {
        let mut timers = self.timers.lock().await;
        if let Some(task) = timers.session.take() {
            task.cancel();
        }
        if let Some(task) = timers.alerts.take() {
            task.cancel();
        }
    }

    // ====== Monitoring session ======

    /// Start a monitoring session and the status-poll timer at the same
    /// cadence the backend scans with.
    pub async fn start_monitoring(
        self: &Arc<Self>,
        interval_seconds: u64,
    ) -> Result<(), RemoteError> {
        self.session.start(interval_seconds).await?;

        let period = Duration::from_secs(
            interval_seconds.clamp(MIN_MONITOR_INTERVAL, MAX_MONITOR_INTERVAL),
        );
        let this = Arc::clone(self);
        let task = RecurringTask::spawn("session-poll", period, move || {
            let this = Arc::clone(&this);
            async move {
                let _ = this.session_tick().await;
            }
        });
        self.timers.lock().await.session = Some(task);
        Ok(())
    }

    /// Stop the active session; finalization may land on a later tick when
    /// the backend winds down slowly.
    pub async fn stop_monitoring(&self) -> Result<PollOutcome, RemoteError> {
        let outcome = self.session.stop().await?;
        if outcome.completed {
            self.on_session_completed().await;
        }
        Ok(outcome)
    }

    /// One session status poll. Called by the poll timer and directly by
    /// tests that need deterministic tick ordering.
    pub async fn session_tick(&self) -> Result<PollOutcome, RemoteError> {
        let outcome = self.session.poll().await?;
        if outcome.completed {
            self.on_session_completed().await;
        }
        Ok(outcome)
    }

    async fn on_session_completed(&self) {
        tracing::info!("[SYNC] session completed; refreshing cached resources");
        let (stats, history, devices, alerts) = tokio::join!(
            self.stats.invalidate(),
            self.history.invalidate(),
            self.devices.invalidate(),
            self.alerts.invalidate(),
        );
        for err in [
            stats.err(),
            history.err(),
            devices.err(),
            alerts.err(),
        ]
        .into_iter()
        .flatten()
        {
            tracing::warn!("[SYNC] post-session refetch failed: {}", err);
        }

        let callback = match self.completion.lock() {
            Ok(slot) => slot.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        if let Some(callback) = callback {
            callback();
        }

        // The session is over; let the poll timer wind down after this tick.
        if let Some(task) = &self.timers.lock().await.session {
            task.request_stop();
        }
    }

    pub async fn session_state(&self) -> SessionState {
        self.session.state().await
    }

    pub async fn monitoring_status(&self) -> MonitoringStatus {
        self.session.status().await
    }

    pub async fn session_error(&self) -> Option<RemoteError> {
        self.session.last_error().await
    }

    // ====== Alerts ======

    /// One alert poll tick; overlapping ticks are skipped by the poller.
    pub async fn alert_tick(&self) {
        self.poller.tick().await;
    }

    pub async fn unread_count(&self) -> usize {
        self.poller.unread_count().await
    }

    pub async fn mark_alert_read(&self, alert_id: i64) -> Result<(), RemoteError> {
        self.boundary.mark_alert_read(alert_id).await?;
        if let Err(err) = self.alerts.invalidate().await {
            tracing::warn!("[SYNC] alert refetch after mark-read failed: {}", err);
        }
        Ok(())
    }

    pub async fn mark_all_alerts_read(&self) -> Result<(), RemoteError> {
        self.boundary.mark_all_alerts_read().await?;
        if let Err(err) = self.alerts.invalidate().await {
            tracing::warn!("[SYNC] alert refetch after mark-all-read failed: {}", err);
        }
        Ok(())
    }

    // ====== Devices ======

    /// Rename a device. The cache is only invalidated after the backend
    /// accepts the rename; a failure leaves last-known-good data in place.
    pub async fn rename_device(&self, mac: &str, name: &str) -> Result<(), RemoteError> {
        let mac = normalize_mac(mac)
            .ok_or_else(|| RemoteError::Rejected(format!("invalid MAC address: {}", mac)))?;
        self.boundary
            .update_device_name(mac, name.to_string())
            .await?;
        if let Err(err) = self.devices.invalidate().await {
            tracing::warn!("[SYNC] device refetch after rename failed: {}", err);
        }
        Ok(())
    }

    // ====== Resource access ======

    pub async fn fetch_stats(&self) -> Result<NetworkStats, RemoteError> {
        self.stats.fetch().await
    }

    pub async fn fetch_history(&self) -> Result<Vec<ScanRecord>, RemoteError> {
        self.history.fetch().await
    }

    pub async fn fetch_devices(&self) -> Result<Vec<DeviceRecord>, RemoteError> {
        self.devices.fetch().await
    }

    pub async fn fetch_alerts(&self) -> Result<Vec<AlertRecord>, RemoteError> {
        self.alerts.fetch().await
    }

    pub async fn stats_snapshot(&self) -> CacheSnapshot<NetworkStats> {
        self.stats.snapshot().await
    }

    pub async fn history_snapshot(&self) -> CacheSnapshot<Vec<ScanRecord>> {
        self.history.snapshot().await
    }

    pub async fn devices_snapshot(&self) -> CacheSnapshot<Vec<DeviceRecord>> {
        self.devices.snapshot().await
    }

    pub async fn alerts_snapshot(&self) -> CacheSnapshot<Vec<AlertRecord>> {
        self.alerts.snapshot().await
    }

    /// Force a new devices request even while one is in flight. The
    /// sequence guard keeps the responses in request order.
    pub async fn invalidate_devices(&self) -> Result<Vec<DeviceRecord>, RemoteError> {
        self.devices.invalidate().await
    }

    // ====== Event feed ======

    pub fn feed_entries(&self) -> Vec<FeedEntry> {
        lock_feed(&self.feed).to_vec()
    }

    /// Drain the feed oldest-first (used by streaming surfaces).
    pub fn drain_feed(&self) -> Vec<FeedEntry> {
        lock_feed(&self.feed).drain()
    }

    /// User-initiated feed reset.
    pub fn clear_feed(&self) {
        lock_feed(&self.feed).clear();
    }
}
