//! Monitoring session state machine
//!
//! Poll-driven lifecycle of one scan session. The backend owns the truth;
//! the session reflects the latest status poll and derives feed events from
//! the differences between consecutive polls.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::config::{MAX_MONITOR_INTERVAL, MIN_MONITOR_INTERVAL};
use crate::remote::{RemoteBoundary, RemoteError};
use crate::sync::events::{MonitoringStatus, NetworkEvent, ScanPhase};

/// Callback receiving derived monitoring events
pub type EventCallback = Arc<dyn Fn(NetworkEvent) + Send + Sync>;

/// Session lifecycle states
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Starting,
    Running(ScanPhase),
    Completing,
    Error,
}

impl SessionState {
    fn is_active(&self) -> bool {
        matches!(
            self,
            SessionState::Starting | SessionState::Running(_) | SessionState::Completing
        )
    }
}

/// Result of one status poll
#[derive(Debug, Clone)]
pub struct PollOutcome {
    pub state_before: SessionState,
    pub state_after: SessionState,
    /// True exactly once per session: the tick that took the machine
    /// through `Completing` to `Idle`.
    pub completed: bool,
}

struct SessionInner {
    state: SessionState,
    status: MonitoringStatus,
    last_phase: Option<ScanPhase>,
    last_error: Option<RemoteError>,
    start_in_flight: bool,
}

/// State machine governing one scan session's lifecycle
pub struct MonitoringSession {
    boundary: Arc<dyn RemoteBoundary>,
    inner: Mutex<SessionInner>,
    events: EventCallback,
}

impl MonitoringSession {
    pub fn new(boundary: Arc<dyn RemoteBoundary>, events: EventCallback) -> Self {
        Self {
            boundary,
            inner: Mutex::new(SessionInner {
                state: SessionState::Idle,
                status: MonitoringStatus::default(),
                last_phase: None,
                last_error: None,
                start_in_flight: false,
            }),
            events,
        }
    }

    pub async fn state(&self) -> SessionState {
        self.inner.lock().await.state.clone()
    }

    /// Last known status from the backend. Retained across RPC failures.
    pub async fn status(&self) -> MonitoringStatus {
        self.inner.lock().await.status.clone()
    }

    pub async fn last_error(&self) -> Option<RemoteError> {
        self.inner.lock().await.last_error.clone()
    }

    /// Start a session. Valid from `Idle` and `Error` (the recovery path).
    /// Starting while a session is active is rejected locally before any
    /// backend call; a concurrent duplicate is rejected by the backend.
    pub async fn start(&self, interval_seconds: u64) -> Result<(), RemoteError> {
        let interval = interval_seconds.clamp(MIN_MONITOR_INTERVAL, MAX_MONITOR_INTERVAL);

        {
            let mut inner = self.inner.lock().await;
            if inner.state.is_active() || inner.start_in_flight {
                let err = RemoteError::Rejected(
                    "monitoring session already active".to_string(),
                );
                inner.last_error = Some(err.clone());
                return Err(err);
            }
            inner.start_in_flight = true;
        }

        let accepted = self.boundary.start_monitoring(interval).await;

        let mut inner = self.inner.lock().await;
        inner.start_in_flight = false;
        match accepted {
            Ok(()) => {
                inner.state = SessionState::Starting;
                inner.last_phase = None;
                inner.last_error = None;
                inner.status.is_running = true;
                inner.status.interval_seconds = interval;
                (self.events)(NetworkEvent::MonitoringStarted {
                    interval_seconds: interval,
                });
                tracing::info!(
                    "[SESSION] monitoring started (interval: {}s)",
                    interval
                );
                Ok(())
            }
            Err(err) => {
                // The session never began; stay Idle and surface the error.
                inner.state = SessionState::Idle;
                inner.last_error = Some(err.clone());
                (self.events)(NetworkEvent::MonitoringError {
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Fetch the current status and advance the machine.
    ///
    /// An RPC failure while a session is active moves to `Error`, retains
    /// the last known status, and is recoverable only via `start()`.
    pub async fn poll(&self) -> Result<PollOutcome, RemoteError> {
        match self.boundary.get_monitoring_status().await {
            Ok(status) => Ok(self.apply_status(status).await),
            Err(err) => {
                let mut inner = self.inner.lock().await;
                if inner.state.is_active() {
                    inner.state = SessionState::Error;
                    inner.last_error = Some(err.clone());
                    (self.events)(NetworkEvent::MonitoringError {
                        message: err.to_string(),
                    });
                    tracing::warn!("[SESSION] status poll failed: {}", err);
                }
                Err(err)
            }
        }
    }

    /// Stop the active session. The stop request is not assumed immediate:
    /// one confirming status poll decides whether the machine finalizes now
    /// or on a later tick.
    pub async fn stop(&self) -> Result<PollOutcome, RemoteError> {
        {
            let inner = self.inner.lock().await;
            match inner.state {
                SessionState::Starting | SessionState::Running(_) => {}
                _ => {
                    return Err(RemoteError::Rejected(
                        "no monitoring session to stop".to_string(),
                    ));
                }
            }
        }

        let stop_result = self.boundary.stop_monitoring().await;
        match &stop_result {
            Ok(()) => (self.events)(NetworkEvent::MonitoringStopped),
            Err(err) => tracing::warn!(
                "[SESSION] stop request failed: {}; confirming via status poll",
                err
            ),
        }

        let outcome = self.poll().await?;
        if outcome.state_after == SessionState::Idle {
            // Backend confirms nothing is running; a failed stop RPC no
            // longer matters.
            return Ok(outcome);
        }
        match stop_result {
            Ok(()) => Ok(outcome),
            Err(err) => Err(err),
        }
    }

    async fn apply_status(&self, status: MonitoringStatus) -> PollOutcome {
        let mut inner = self.inner.lock().await;
        let state_before = inner.state.clone();
        let was_active = inner.state.is_active();
        let prev_scan_count = inner.status.scan_count;
        let prev_online = inner.status.devices_online;
        let prev_total = inner.status.devices_total;
        let mut completed = false;

        if status.is_running {
            let reported = status.current_phase.as_deref().map(ScanPhase::parse);

            if let (Some(previous), Some(new_phase)) = (&inner.last_phase, &reported) {
                if let (Some(prev_ord), Some(new_ord)) =
                    (previous.ordinal(), new_phase.ordinal())
                {
                    if new_ord < prev_ord {
                        tracing::warn!(
                            "[SESSION] phase regressed {} -> {}; backend restarted the session",
                            previous,
                            new_phase
                        );
                        (self.events)(NetworkEvent::PhaseRegression {
                            previous: previous.clone(),
                            reported: new_phase.clone(),
                        });
                    }
                }
            }

            if reported.is_some() && reported != inner.last_phase {
                if let Some(phase) = &reported {
                    (self.events)(NetworkEvent::PhaseChanged {
                        phase: phase.clone(),
                    });
                }
            }

            if !was_active {
                // A session this console did not start (another surface or a
                // console restart). Track it rather than contradicting the
                // backend.
                tracing::info!("[SESSION] adopting already-running backend session");
            }

            if was_active && status.scan_count > prev_scan_count {
                (self.events)(NetworkEvent::ScanCycleCompleted {
                    scan_count: status.scan_count,
                    hosts_online: status.devices_online,
                });
            }
            if was_active
                && (status.devices_online != prev_online || status.devices_total != prev_total)
            {
                (self.events)(NetworkEvent::DevicesChanged {
                    online: status.devices_online,
                    total: status.devices_total,
                });
            }

            let phase = reported
                .clone()
                .or_else(|| inner.last_phase.clone())
                .unwrap_or_else(|| ScanPhase::Unknown("unreported".to_string()));
            inner.state = SessionState::Running(phase);
            if reported.is_some() {
                inner.last_phase = reported;
            }
        } else if was_active {
            inner.state = SessionState::Completing;
            (self.events)(NetworkEvent::SessionCompleted {
                scan_count: status.scan_count,
            });
            tracing::info!(
                "[SESSION] session completed after {} scan cycles",
                status.scan_count
            );
            inner.state = SessionState::Idle;
            inner.last_phase = None;
            completed = true;
        }

        inner.status = status;
        PollOutcome {
            state_before,
            state_after: inner.state.clone(),
            completed,
        }
    }
}
