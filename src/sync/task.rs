//! Recurring background task with a cancellation token
//!
//! Timer loops are owned, never ambient: whoever holds the `RecurringTask`
//! holds the only way to stop it, and dropping it releases the timer.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// A named timer loop invoking an async tick on a fixed period
pub struct RecurringTask {
    name: &'static str,
    cancel: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl RecurringTask {
    /// Spawn the loop. The first tick fires one full period after spawn;
    /// missed ticks are skipped, not replayed.
    pub fn spawn<F, Fut>(name: &'static str, period: Duration, tick: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // interval yields immediately once; consume that so the first
            // real tick lands a full period from now
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if flag.load(Ordering::SeqCst) {
                    break;
                }
                tick().await;
                if flag.load(Ordering::SeqCst) {
                    break;
                }
            }
            tracing::debug!("[TASK] {} stopped", name);
        });
        tracing::debug!("[TASK] {} started (period: {:?})", name, period);
        Self {
            name,
            cancel,
            handle,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Ask the loop to exit after the current tick. Safe to call from
    /// within the tick itself.
    pub fn request_stop(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// Stop immediately: sets the cancel flag and aborts the timer. An
    /// in-flight RPC inside the tick completes on the backend but its
    /// result is discarded.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
        self.handle.abort();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }
}

impl Drop for RecurringTask {
    fn drop(&mut self) {
        self.cancel.store(true, Ordering::SeqCst);
        self.handle.abort();
    }
}
