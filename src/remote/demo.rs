//! Demo backend
//!
//! Deterministic in-memory boundary used when the persisted demo-mode flag
//! is set: seeded devices, scans, and alerts, plus a simulated monitoring
//! session that advances one discovery phase per status poll. No network
//! access anywhere.

use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use tokio::sync::Mutex;

use crate::models::{
    AlertRecord, AlertSeverity, AlertType, DeviceRecord, NetworkStats, ScanRecord,
};
use crate::remote::{RemoteBoundary, RemoteError, RemoteFuture};
use crate::sync::MonitoringStatus;

const DEMO_PHASES: &[&str] = &[
    "discovery",
    "reachability",
    "service-probe",
    "name-resolution",
];

struct DemoSession {
    interval_seconds: u64,
    polls: usize,
}

struct DemoState {
    devices: Vec<DeviceRecord>,
    scans: Vec<ScanRecord>,
    alerts: Vec<AlertRecord>,
    session: Option<DemoSession>,
    completed_sessions: u32,
}

/// In-memory stand-in for the discovery engine
pub struct DemoBoundary {
    state: Arc<Mutex<DemoState>>,
}

impl DemoBoundary {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(seed_state())),
        }
    }
}

impl Default for DemoBoundary {
    fn default() -> Self {
        Self::new()
    }
}

fn seed_state() -> DemoState {
    let now = Utc::now();
    let device = |id: i64, mac: &str, ip: &str, vendor: &str, kind: &str, hostname: Option<&str>| {
        DeviceRecord {
            id,
            mac: mac.to_string(),
            first_seen: now - ChronoDuration::days(30),
            last_seen: now - ChronoDuration::minutes(id),
            last_ip: Some(ip.to_string()),
            vendor: Some(vendor.to_string()),
            device_type: Some(kind.to_string()),
            hostname: hostname.map(str::to_string),
            custom_name: None,
        }
    };

    let devices = vec![
        device(1, "AA:BB:CC:DD:EE:01", "192.168.1.1", "Ubiquiti", "ROUTER", Some("gateway")),
        device(2, "AA:BB:CC:DD:EE:02", "192.168.1.20", "Synology", "NAS", Some("storage")),
        device(3, "AA:BB:CC:DD:EE:03", "192.168.1.31", "Apple", "MOBILE", None),
        device(4, "AA:BB:CC:DD:EE:04", "192.168.1.40", "HP", "PRINTER", Some("office-printer")),
    ];

    let scan = |id: i64, minutes_ago: i64, hosts: i64| ScanRecord {
        id,
        scan_time: now - ChronoDuration::minutes(minutes_ago),
        interface_name: "eth0".to_string(),
        local_ip: "192.168.1.10".to_string(),
        subnet: "192.168.1.0/24".to_string(),
        scan_method: "Active ARP + ICMP + TCP".to_string(),
        arp_discovered: hosts,
        icmp_discovered: hosts - 1,
        total_hosts: hosts,
        duration_ms: 1800 + 100 * id,
    };
    let scans = vec![scan(3, 10, 4), scan(2, 70, 4), scan(1, 130, 3)];

    let alerts = vec![
        AlertRecord {
            id: 1,
            created_at: now - ChronoDuration::minutes(9),
            alert_type: AlertType::NewDevice,
            device_mac: Some("AA:BB:CC:DD:EE:04".to_string()),
            device_ip: Some("192.168.1.40".to_string()),
            message: "New device discovered: 192.168.1.40 (office-printer)".to_string(),
            severity: AlertSeverity::Warning,
            is_read: false,
        },
        AlertRecord {
            id: 2,
            created_at: now - ChronoDuration::minutes(8),
            alert_type: AlertType::HighRisk,
            device_mac: Some("AA:BB:CC:DD:EE:03".to_string()),
            device_ip: Some("192.168.1.31".to_string()),
            message: "Suspicious port 23 open on 192.168.1.31".to_string(),
            severity: AlertSeverity::Error,
            is_read: false,
        },
        AlertRecord {
            id: 3,
            created_at: now - ChronoDuration::hours(3),
            alert_type: AlertType::IpChange,
            device_mac: Some("AA:BB:CC:DD:EE:02".to_string()),
            device_ip: Some("192.168.1.20".to_string()),
            message: "Device storage changed IP: 192.168.1.21 -> 192.168.1.20".to_string(),
            severity: AlertSeverity::Info,
            is_read: true,
        },
    ];

    DemoState {
        devices,
        scans,
        alerts,
        session: None,
        completed_sessions: 0,
    }
}

impl DemoState {
    fn status(&mut self) -> MonitoringStatus {
        let online = self.devices.len();
        match &mut self.session {
            Some(session) => {
                session.polls += 1;
                if session.polls <= DEMO_PHASES.len() {
                    MonitoringStatus {
                        is_running: true,
                        interval_seconds: session.interval_seconds,
                        scan_count: self.completed_sessions,
                        last_scan_time: Some(Utc::now().to_rfc3339()),
                        devices_online: online,
                        devices_total: online,
                        current_phase: Some(DEMO_PHASES[session.polls - 1].to_string()),
                    }
                } else {
                    // Phase sequence exhausted; the simulated session ends.
                    let interval = session.interval_seconds;
                    self.session = None;
                    self.completed_sessions += 1;
                    MonitoringStatus {
                        is_running: false,
                        interval_seconds: interval,
                        scan_count: self.completed_sessions,
                        last_scan_time: Some(Utc::now().to_rfc3339()),
                        devices_online: online,
                        devices_total: online,
                        current_phase: None,
                    }
                }
            }
            None => MonitoringStatus {
                is_running: false,
                scan_count: self.completed_sessions,
                devices_online: online,
                devices_total: online,
                ..MonitoringStatus::default()
            },
        }
    }
}

impl RemoteBoundary for DemoBoundary {
    fn get_network_stats(&self) -> RemoteFuture<'_, NetworkStats> {
        Box::pin(async move {
            let state = self.state.lock().await;
            let total = state.devices.len() as i64;
            Ok(NetworkStats {
                total_devices: total,
                online_devices: total,
                offline_devices: 0,
                new_devices_24h: 1,
                high_risk_devices: 1,
                total_scans: state.scans.len() as i64,
                last_scan_time: state.scans.first().map(|scan| scan.scan_time),
            })
        })
    }

    fn get_scan_history(&self, limit: u32) -> RemoteFuture<'_, Vec<ScanRecord>> {
        Box::pin(async move {
            let state = self.state.lock().await;
            Ok(state.scans.iter().take(limit as usize).cloned().collect())
        })
    }

    fn get_all_devices(&self) -> RemoteFuture<'_, Vec<DeviceRecord>> {
        Box::pin(async move { Ok(self.state.lock().await.devices.clone()) })
    }

    fn update_device_name(&self, mac: String, name: String) -> RemoteFuture<'_, ()> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            match state.devices.iter_mut().find(|device| device.mac == mac) {
                Some(device) => {
                    device.custom_name = Some(name);
                    Ok(())
                }
                None => Err(RemoteError::Rejected(format!("unknown device: {}", mac))),
            }
        })
    }

    fn get_unread_alerts(&self) -> RemoteFuture<'_, Vec<AlertRecord>> {
        Box::pin(async move {
            let state = self.state.lock().await;
            Ok(state
                .alerts
                .iter()
                .filter(|alert| !alert.is_read)
                .cloned()
                .collect())
        })
    }

    fn mark_alert_read(&self, alert_id: i64) -> RemoteFuture<'_, ()> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            match state.alerts.iter_mut().find(|alert| alert.id == alert_id) {
                Some(alert) => {
                    alert.is_read = true;
                    Ok(())
                }
                None => Err(RemoteError::Rejected(format!("unknown alert: {}", alert_id))),
            }
        })
    }

    fn mark_all_alerts_read(&self) -> RemoteFuture<'_, ()> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            for alert in &mut state.alerts {
                alert.is_read = true;
            }
            Ok(())
        })
    }

    fn start_monitoring(&self, interval_seconds: u64) -> RemoteFuture<'_, ()> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            if state.session.is_some() {
                return Err(RemoteError::Rejected(
                    "monitoring already running".to_string(),
                ));
            }
            state.session = Some(DemoSession {
                interval_seconds,
                polls: 0,
            });
            Ok(())
        })
    }

    fn stop_monitoring(&self) -> RemoteFuture<'_, ()> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            if state.session.take().is_some() {
                state.completed_sessions += 1;
            }
            Ok(())
        })
    }

    fn get_monitoring_status(&self) -> RemoteFuture<'_, MonitoringStatus> {
        Box::pin(async move { Ok(self.state.lock().await.status()) })
    }
}
