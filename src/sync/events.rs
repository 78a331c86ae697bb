//! Monitoring events and session status
//!
//! Event types surfaced to the presentation layer while a session runs.

use serde::{Deserialize, Serialize};

/// Events derived from monitoring polls, in arrival order.
///
/// The kind set is closed: presentation code matches exhaustively and the
/// core never dispatches on free-form strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "data")]
pub enum NetworkEvent {
    /// Monitoring session accepted by the backend
    MonitoringStarted { interval_seconds: u64 },

    /// Monitoring session confirmed stopped
    MonitoringStopped,

    /// Backend moved to a new discovery phase
    PhaseChanged { phase: ScanPhase },

    /// A later poll reported an earlier phase; treated as a new backend
    /// session and surfaced rather than hidden
    PhaseRegression {
        previous: ScanPhase,
        reported: ScanPhase,
    },

    /// One scan cycle finished (scan counter advanced)
    ScanCycleCompleted { scan_count: u32, hosts_online: usize },

    /// Online/total device counts moved between polls
    DevicesChanged { online: usize, total: usize },

    /// The session wound down and observers were refreshed
    SessionCompleted { scan_count: u32 },

    /// Error surfaced during monitoring
    MonitoringError { message: String },
}

/// Current session summary as reported by the backend status poll
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringStatus {
    pub is_running: bool,
    pub interval_seconds: u64,
    pub scan_count: u32,
    pub last_scan_time: Option<String>,
    pub devices_online: usize,
    pub devices_total: usize,
    /// Phase name the backend reports while running
    pub current_phase: Option<String>,
}

impl Default for MonitoringStatus {
    fn default() -> Self {
        Self {
            is_running: false,
            interval_seconds: 60,
            scan_count: 0,
            last_scan_time: None,
            devices_online: 0,
            devices_total: 0,
            current_phase: None,
        }
    }
}

/// Discovery phase within a running scan.
///
/// Known phases form an ordered sequence; `Unknown` covers names the
/// backend may introduce later and deliberately carries no position.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "phase", content = "name", rename_all = "snake_case")]
pub enum ScanPhase {
    Discovery,
    Reachability,
    ServiceProbe,
    NameResolution,
    Unknown(String),
}

impl ScanPhase {
    /// Parse a backend-reported phase name. Exact token match after
    /// normalization; anything else is `Unknown`, never silently dropped.
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "discovery" => ScanPhase::Discovery,
            "reachability" => ScanPhase::Reachability,
            "service-probe" => ScanPhase::ServiceProbe,
            "name-resolution" => ScanPhase::NameResolution,
            _ => ScanPhase::Unknown(raw.trim().to_string()),
        }
    }

    /// Position in the phase sequence. `Unknown` has none, so it neither
    /// triggers nor suppresses regression detection.
    pub fn ordinal(&self) -> Option<usize> {
        match self {
            ScanPhase::Discovery => Some(0),
            ScanPhase::Reachability => Some(1),
            ScanPhase::ServiceProbe => Some(2),
            ScanPhase::NameResolution => Some(3),
            ScanPhase::Unknown(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ScanPhase::Discovery => "discovery",
            ScanPhase::Reachability => "reachability",
            ScanPhase::ServiceProbe => "service-probe",
            ScanPhase::NameResolution => "name-resolution",
            ScanPhase::Unknown(name) => name,
        }
    }
}

impl std::fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
