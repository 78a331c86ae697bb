//! RPC boundary to the discovery backend
//!
//! The console never assumes push delivery: every backend state change is
//! discovered by polling or explicit refetch through this boundary.

pub mod demo;
pub mod http;

use std::future::Future;
use std::pin::Pin;

use crate::models::{AlertRecord, DeviceRecord, NetworkStats, ScanRecord};
use crate::sync::MonitoringStatus;

pub use demo::DemoBoundary;
pub use http::HttpBoundary;

/// Boxed future returned by boundary calls
pub type RemoteFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, RemoteError>> + Send + 'a>>;

/// Errors crossing the RPC boundary.
///
/// `Stale` never escapes the cache layer; callers only ever observe
/// `Transport` and `Rejected`.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum RemoteError {
    /// Backend unreachable, timed out, or failed internally
    #[error("backend unreachable: {0}")]
    Transport(String),

    /// Backend refused the operation (e.g. start while already running)
    #[error("backend rejected request: {0}")]
    Rejected(String),

    /// Response arrived for a superseded request; discarded internally
    #[error("stale response for {resource} (request #{seq})")]
    Stale { resource: &'static str, seq: u64 },
}

/// Request/response contract with the discovery backend.
///
/// Calls are idempotent except `update_device_name`, `mark_alert_read`,
/// `mark_all_alerts_read`, `start_monitoring`, and `stop_monitoring`.
/// Collection responses carry full replacements, never deltas.
pub trait RemoteBoundary: Send + Sync {
    fn get_network_stats(&self) -> RemoteFuture<'_, NetworkStats>;

    /// Scan history, ordered newest-first, at most `limit` records.
    fn get_scan_history(&self, limit: u32) -> RemoteFuture<'_, Vec<ScanRecord>>;

    fn get_all_devices(&self) -> RemoteFuture<'_, Vec<DeviceRecord>>;

    /// Set a device's custom name. Keyed by MAC.
    fn update_device_name(&self, mac: String, name: String) -> RemoteFuture<'_, ()>;

    fn get_unread_alerts(&self) -> RemoteFuture<'_, Vec<AlertRecord>>;

    fn mark_alert_read(&self, alert_id: i64) -> RemoteFuture<'_, ()>;

    fn mark_all_alerts_read(&self) -> RemoteFuture<'_, ()>;

    /// Start a monitoring session. Rejected when one is already running.
    fn start_monitoring(&self, interval_seconds: u64) -> RemoteFuture<'_, ()>;

    /// Request the running session to stop. Acknowledgement does not mean
    /// the session has already wound down; poll status to confirm.
    fn stop_monitoring(&self) -> RemoteFuture<'_, ()>;

    fn get_monitoring_status(&self) -> RemoteFuture<'_, MonitoringStatus>;
}
