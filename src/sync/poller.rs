//! Unread-alert poller
//!
//! Each tick replaces the cached unread collection in full; the unread
//! count is always the size of the latest fetch, never adjusted locally.
//! A tick that fires while the previous fetch is still in flight is
//! skipped, not queued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::models::AlertRecord;
use crate::sync::cache::ResourceCache;

pub struct AlertPoller {
    cache: Arc<ResourceCache<Vec<AlertRecord>>>,
    busy: Arc<AtomicBool>,
}

impl AlertPoller {
    pub fn new(cache: Arc<ResourceCache<Vec<AlertRecord>>>) -> Self {
        Self {
            cache,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// One poll tick: force a full refetch of the unread set. Failures are
    /// recorded on the cache (stale value retained) and the next tick
    /// retries; overlapping ticks are skipped.
    pub async fn tick(&self) {
        if self.busy.swap(true, Ordering::SeqCst) {
            tracing::debug!("[ALERTS] previous fetch still in flight; skipping tick");
            return;
        }
        if let Err(err) = self.cache.invalidate().await {
            tracing::warn!("[ALERTS] unread refetch failed: {}", err);
        }
        self.busy.store(false, Ordering::SeqCst);
    }

    /// Derived unread count: the size of the latest fetched collection.
    pub async fn unread_count(&self) -> usize {
        self.cache
            .value()
            .await
            .map(|alerts| alerts.len())
            .unwrap_or(0)
    }
}
