//! Configuration constants for the NEXUS operator console

use std::time::Duration;

// ====== Monitoring Session Configuration ======

/// Default monitoring interval in seconds
pub const DEFAULT_MONITOR_INTERVAL: u64 = 60;

/// Minimum monitoring interval in seconds
pub const MIN_MONITOR_INTERVAL: u64 = 10;

/// Maximum monitoring interval in seconds
pub const MAX_MONITOR_INTERVAL: u64 = 3600;

// ====== Event Feed Configuration ======

/// Maximum entries retained in the monitoring event feed.
/// Oldest entries are evicted first once the feed is full.
pub const EVENT_FEED_CAPACITY: usize = 300;

// ====== Alert Polling Configuration ======

/// Cadence of the unread-alert poller
pub const ALERT_POLL_INTERVAL: Duration = Duration::from_secs(5);

// ====== Resource Fetch Configuration ======

/// Number of scan records requested per history refetch (newest first)
pub const SCAN_HISTORY_LIMIT: u32 = 50;

/// Per-request timeout for backend RPC calls
pub const REMOTE_TIMEOUT: Duration = Duration::from_secs(10);

/// Default backend base URL when NEXUS_CONSOLE_BACKEND is unset
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8787";
