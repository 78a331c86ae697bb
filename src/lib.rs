//! NEXUS Console - Synchronization core for the NEXUS discovery engine
//!
//! This crate keeps an operator console consistent with a remote discovery
//! backend:
//! - Cached backend collections with invalidate-and-refetch semantics
//! - Monitoring session lifecycle tracking across discovery phases
//! - A bounded, ordered feed of live monitoring events
//! - Recurring unread-alert polling
//! - A CLI surface over the same orchestrator the UI consumes

pub mod app;
pub mod cli;
mod command_handlers;
pub mod config;
pub mod logging;
pub mod models;
pub mod remote;
pub mod settings;
pub mod sync;

pub use app::{AppCommandResult, AppContext, OutputHook, WatchSummary};
pub use cli::{parse_cli_args, CliCommand, CliInvocation};
pub use config::*;
pub use models::{
    normalize_mac, AlertRecord, AlertSeverity, AlertType, DeviceRecord, NetworkStats, ScanRecord,
};
pub use remote::{DemoBoundary, HttpBoundary, RemoteBoundary, RemoteError, RemoteFuture};
pub use settings::ConsoleSettings;
pub use sync::{
    AlertPoller, CacheSnapshot, EventFeed, FeedEntry, MonitoringSession, MonitoringStatus,
    NetworkEvent, PollOutcome, RecurringTask, ResourceCache, ScanPhase, SessionState, SyncConfig,
    SyncOrchestrator,
};
