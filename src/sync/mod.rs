//! Synchronization and live-monitoring core
//!
//! Keeps locally cached backend collections consistent under an
//! invalidate-and-refetch discipline and tracks the lifecycle of a
//! monitoring session across its discovery phases.

pub mod cache;
pub mod events;
pub mod feed;
pub mod orchestrator;
pub mod poller;
pub mod session;
pub mod task;

pub use cache::{CacheSnapshot, Fetcher, ResourceCache};
pub use events::{MonitoringStatus, NetworkEvent, ScanPhase};
pub use feed::{EventFeed, FeedEntry};
pub use orchestrator::{CompletionCallback, SyncConfig, SyncOrchestrator};
pub use poller::AlertPoller;
pub use session::{EventCallback, MonitoringSession, PollOutcome, SessionState};
pub use task::RecurringTask;
