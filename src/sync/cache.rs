//! Per-resource cache with invalidate-and-refetch consistency
//!
//! A cache owns one backend-sourced collection or record. It is never
//! patched incrementally: a refetch replaces the value wholesale, and a
//! failed refetch keeps the previous value (stale-but-available) next to
//! the error. Responses are applied in request order; a response that
//! arrives after a newer request has completed is discarded.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::{watch, Mutex};

use crate::remote::RemoteError;

/// Closure issuing the backend call for one resource. Held by the cache so
/// `invalidate()` can refetch without caller involvement.
pub type Fetcher<T> =
    Arc<dyn Fn() -> Pin<Box<dyn Future<Output = Result<T, RemoteError>> + Send>> + Send + Sync>;

/// Observable cache state for consumers
#[derive(Debug, Clone)]
pub struct CacheSnapshot<T> {
    pub value: Option<T>,
    pub error: Option<RemoteError>,
    pub is_loading: bool,
}

struct CacheState<T> {
    value: Option<T>,
    error: Option<RemoteError>,
    /// Sequence of the most recently issued, still-unresolved request
    inflight: Option<u64>,
    /// Last sequence handed out
    next_seq: u64,
    /// Highest sequence whose response was applied
    applied_seq: u64,
}

impl<T: Clone> CacheState<T> {
    fn current_result(&self) -> Result<T, RemoteError> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        match &self.value {
            Some(value) => Ok(value.clone()),
            None => Err(RemoteError::Transport(
                "no data fetched yet".to_string(),
            )),
        }
    }
}

/// One cached backend resource
pub struct ResourceCache<T> {
    resource: &'static str,
    fetcher: Fetcher<T>,
    state: Mutex<CacheState<T>>,
    /// Completion counter for coalesced waiters
    done_tx: watch::Sender<u64>,
}

impl<T: Clone> ResourceCache<T> {
    /// Build a cache around an async fetch closure.
    pub fn new<F, Fut>(resource: &'static str, fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, RemoteError>> + Send + 'static,
    {
        let fetcher: Fetcher<T> = Arc::new(move || {
            let fut: Pin<Box<dyn Future<Output = Result<T, RemoteError>> + Send>> =
                Box::pin(fetch());
            fut
        });
        Self::with_fetcher(resource, fetcher)
    }

    pub fn with_fetcher(resource: &'static str, fetcher: Fetcher<T>) -> Self {
        let (done_tx, _done_rx) = watch::channel(0u64);
        Self {
            resource,
            fetcher,
            state: Mutex::new(CacheState {
                value: None,
                error: None,
                inflight: None,
                next_seq: 0,
                applied_seq: 0,
            }),
            done_tx,
        }
    }

    pub fn resource(&self) -> &'static str {
        self.resource
    }

    /// Fetch the resource. When a request is already in flight the call is
    /// coalesced: no second backend call is issued and the caller shares
    /// the pending outcome.
    pub async fn fetch(&self) -> Result<T, RemoteError> {
        let issued = {
            let mut state = self.state.lock().await;
            match state.inflight {
                Some(pending) => Err(pending),
                None => {
                    state.next_seq += 1;
                    let seq = state.next_seq;
                    state.inflight = Some(seq);
                    Ok(seq)
                }
            }
        };

        match issued {
            Ok(seq) => self.run_request(seq).await,
            Err(pending) => self.wait_for(pending).await,
        }
    }

    /// Mark the cache stale and refetch immediately. Always issues a new
    /// request, even while an earlier one is still in flight; the sequence
    /// guard keeps the earlier response from overwriting the newer one.
    pub async fn invalidate(&self) -> Result<T, RemoteError> {
        let seq = {
            let mut state = self.state.lock().await;
            state.next_seq += 1;
            let seq = state.next_seq;
            state.inflight = Some(seq);
            seq
        };
        tracing::debug!(
            "[CACHE] {} invalidated; refetching (request #{})",
            self.resource,
            seq
        );
        self.run_request(seq).await
    }

    async fn run_request(&self, seq: u64) -> Result<T, RemoteError> {
        let result = (self.fetcher)().await;

        let outcome = {
            let mut state = self.state.lock().await;
            if state.inflight == Some(seq) {
                state.inflight = None;
            }

            if seq <= state.applied_seq {
                // A newer request already completed; this response is stale
                // and must not be applied. Handled here, never surfaced.
                let stale = RemoteError::Stale {
                    resource: self.resource,
                    seq,
                };
                tracing::debug!("[CACHE] discarded {}", stale);
                state.current_result()
            } else {
                state.applied_seq = seq;
                match result {
                    Ok(value) => {
                        state.value = Some(value.clone());
                        state.error = None;
                        Ok(value)
                    }
                    Err(err) => {
                        // Keep last-known-good value alongside the error.
                        tracing::warn!(
                            "[CACHE] {} refetch failed: {}",
                            self.resource,
                            err
                        );
                        state.error = Some(err.clone());
                        Err(err)
                    }
                }
            }
        };

        self.done_tx.send_modify(|done| *done = (*done).max(seq));
        outcome
    }

    async fn wait_for(&self, pending: u64) -> Result<T, RemoteError> {
        let mut done_rx = self.done_tx.subscribe();
        while *done_rx.borrow_and_update() < pending {
            if done_rx.changed().await.is_err() {
                break;
            }
        }
        let state = self.state.lock().await;
        state.current_result()
    }

    pub async fn snapshot(&self) -> CacheSnapshot<T> {
        let state = self.state.lock().await;
        CacheSnapshot {
            value: state.value.clone(),
            error: state.error.clone(),
            is_loading: state.inflight.is_some(),
        }
    }

    /// Last successfully fetched value, if any (possibly stale when an
    /// error is also present).
    pub async fn value(&self) -> Option<T> {
        self.state.lock().await.value.clone()
    }
}
