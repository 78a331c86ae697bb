//! Bounded monitoring event feed
//!
//! Append-only FIFO audit trail of events in arrival order. Two identical
//! events are two distinct entries; deduplicated alerting is the backend's
//! job, not the feed's.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::events::NetworkEvent;

/// One feed entry with its arrival stamp. Ordering authority is the feed
/// position, not the wall-clock stamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedEntry {
    pub received_at: DateTime<Utc>,
    pub event: NetworkEvent,
}

/// Capacity-bounded FIFO of monitoring events
#[derive(Debug)]
pub struct EventFeed {
    capacity: usize,
    entries: VecDeque<FeedEntry>,
}

impl EventFeed {
    /// Capacity comes from configuration; callers never hard-code it.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity.min(64)),
        }
    }

    /// Append at the tail, evicting the oldest entry when full.
    pub fn push(&mut self, event: NetworkEvent) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(FeedEntry {
            received_at: Utc::now(),
            event,
        });
    }

    /// Empty the feed. User-initiated; never called implicitly.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries oldest-first
    pub fn entries(&self) -> impl Iterator<Item = &FeedEntry> {
        self.entries.iter()
    }

    /// Snapshot of the entries, oldest-first
    pub fn to_vec(&self) -> Vec<FeedEntry> {
        self.entries.iter().cloned().collect()
    }

    /// Drain all entries oldest-first, leaving the feed empty
    pub fn drain(&mut self) -> Vec<FeedEntry> {
        self.entries.drain(..).collect()
    }
}
