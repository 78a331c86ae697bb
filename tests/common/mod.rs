#![allow(dead_code)]

//! Shared test double for the backend boundary.
//!
//! Call counts, scripted status responses, and oneshot gates give tests
//! full control over request interleaving without a real backend.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::Utc;
use tokio::sync::{oneshot, Mutex};

use nexus_console::{
    AlertRecord, AlertSeverity, AlertType, DeviceRecord, MonitoringStatus, NetworkStats,
    RemoteBoundary, RemoteError, RemoteFuture, ScanRecord,
};

#[derive(Default)]
pub struct CallCounts {
    pub stats: AtomicUsize,
    pub history: AtomicUsize,
    pub devices: AtomicUsize,
    pub unread_alerts: AtomicUsize,
    pub update_name: AtomicUsize,
    pub mark_read: AtomicUsize,
    pub mark_all_read: AtomicUsize,
    pub start: AtomicUsize,
    pub stop: AtomicUsize,
    pub status: AtomicUsize,
}

struct ScriptState {
    devices: Vec<DeviceRecord>,
    alerts: Vec<AlertRecord>,
    scans: Vec<ScanRecord>,
    statuses: VecDeque<MonitoringStatus>,
    running: bool,
    fail_next_status: bool,
    fail_next_alerts: bool,
    device_gates: VecDeque<oneshot::Receiver<()>>,
    device_responses: VecDeque<Vec<DeviceRecord>>,
    alert_gates: VecDeque<oneshot::Receiver<()>>,
}

pub struct ScriptedBoundary {
    pub calls: CallCounts,
    state: Mutex<ScriptState>,
}

impl ScriptedBoundary {
    pub fn new() -> Self {
        Self {
            calls: CallCounts::default(),
            state: Mutex::new(ScriptState {
                devices: Vec::new(),
                alerts: Vec::new(),
                scans: Vec::new(),
                statuses: VecDeque::new(),
                running: false,
                fail_next_status: false,
                fail_next_alerts: false,
                device_gates: VecDeque::new(),
                device_responses: VecDeque::new(),
                alert_gates: VecDeque::new(),
            }),
        }
    }

    pub async fn set_devices(&self, devices: Vec<DeviceRecord>) {
        self.state.lock().await.devices = devices;
    }

    pub async fn set_alerts(&self, alerts: Vec<AlertRecord>) {
        self.state.lock().await.alerts = alerts;
    }

    pub async fn add_alert(&self, alert: AlertRecord) {
        self.state.lock().await.alerts.push(alert);
    }

    pub async fn push_status(&self, status: MonitoringStatus) {
        self.state.lock().await.statuses.push_back(status);
    }

    pub async fn set_running(&self, running: bool) {
        self.state.lock().await.running = running;
    }

    pub async fn fail_next_status(&self) {
        self.state.lock().await.fail_next_status = true;
    }

    pub async fn fail_next_alerts(&self) {
        self.state.lock().await.fail_next_alerts = true;
    }

    /// Block the next `get_all_devices` call until the returned sender
    /// fires (or is dropped).
    pub async fn gate_next_devices(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.state.lock().await.device_gates.push_back(rx);
        tx
    }

    /// Script the response for the next `get_all_devices` call. Calls
    /// without a scripted response return the current device list.
    pub async fn queue_devices_response(&self, devices: Vec<DeviceRecord>) {
        self.state.lock().await.device_responses.push_back(devices);
    }

    /// Block the next `get_unread_alerts` call until the sender fires.
    pub async fn gate_next_alerts(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.state.lock().await.alert_gates.push_back(rx);
        tx
    }
}

impl RemoteBoundary for ScriptedBoundary {
    fn get_network_stats(&self) -> RemoteFuture<'_, NetworkStats> {
        Box::pin(async move {
            self.calls.stats.fetch_add(1, Ordering::SeqCst);
            let state = self.state.lock().await;
            Ok(NetworkStats {
                total_devices: state.devices.len() as i64,
                online_devices: state.devices.len() as i64,
                offline_devices: 0,
                new_devices_24h: 0,
                high_risk_devices: 0,
                total_scans: state.scans.len() as i64,
                last_scan_time: None,
            })
        })
    }

    fn get_scan_history(&self, limit: u32) -> RemoteFuture<'_, Vec<ScanRecord>> {
        Box::pin(async move {
            self.calls.history.fetch_add(1, Ordering::SeqCst);
            let state = self.state.lock().await;
            Ok(state.scans.iter().take(limit as usize).cloned().collect())
        })
    }

    fn get_all_devices(&self) -> RemoteFuture<'_, Vec<DeviceRecord>> {
        Box::pin(async move {
            self.calls.devices.fetch_add(1, Ordering::SeqCst);
            let (gate, response) = {
                let mut state = self.state.lock().await;
                (
                    state.device_gates.pop_front(),
                    state.device_responses.pop_front(),
                )
            };
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            match response {
                Some(devices) => Ok(devices),
                None => Ok(self.state.lock().await.devices.clone()),
            }
        })
    }

    fn update_device_name(&self, mac: String, name: String) -> RemoteFuture<'_, ()> {
        Box::pin(async move {
            self.calls.update_name.fetch_add(1, Ordering::SeqCst);
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
            self.calls.unread_alerts.fetch_add(1, Ordering::SeqCst);
            let gate = {
                let mut state = self.state.lock().await;
                if state.fail_next_alerts {
                    state.fail_next_alerts = false;
                    return Err(RemoteError::Transport(
                        "alert fetch timed out".to_string(),
                    ));
                }
                state.alert_gates.pop_front()
            };
            if let Some(gate) = gate {
                let _ = gate.await;
            }
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
            self.calls.mark_read.fetch_add(1, Ordering::SeqCst);
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
            self.calls.mark_all_read.fetch_add(1, Ordering::SeqCst);
            let mut state = self.state.lock().await;
            for alert in &mut state.alerts {
                alert.is_read = true;
            }
            Ok(())
        })
    }

    fn start_monitoring(&self, _interval_seconds: u64) -> RemoteFuture<'_, ()> {
        Box::pin(async move {
            self.calls.start.fetch_add(1, Ordering::SeqCst);
            let mut state = self.state.lock().await;
            if state.running {
                return Err(RemoteError::Rejected(
                    "monitoring already running".to_string(),
                ));
            }
            state.running = true;
            Ok(())
        })
    }

    fn stop_monitoring(&self) -> RemoteFuture<'_, ()> {
        Box::pin(async move {
            self.calls.stop.fetch_add(1, Ordering::SeqCst);
            self.state.lock().await.running = false;
            Ok(())
        })
    }

    fn get_monitoring_status(&self) -> RemoteFuture<'_, MonitoringStatus> {
        Box::pin(async move {
            self.calls.status.fetch_add(1, Ordering::SeqCst);
            let mut state = self.state.lock().await;
            if state.fail_next_status {
                state.fail_next_status = false;
                return Err(RemoteError::Transport("status poll timed out".to_string()));
            }
            match state.statuses.pop_front() {
                Some(status) => Ok(status),
                None => Ok(MonitoringStatus {
                    is_running: state.running,
                    ..MonitoringStatus::default()
                }),
            }
        })
    }
}

// ====== Record builders ======

pub fn device(id: i64, mac: &str) -> DeviceRecord {
    DeviceRecord {
        id,
        mac: mac.to_string(),
        first_seen: Utc::now(),
        last_seen: Utc::now(),
        last_ip: Some(format!("192.168.1.{}", 10 + id)),
        vendor: Some("TestVendor".to_string()),
        device_type: Some("PC".to_string()),
        hostname: None,
        custom_name: None,
    }
}

pub fn alert(id: i64, is_read: bool) -> AlertRecord {
    AlertRecord {
        id,
        created_at: Utc::now(),
        alert_type: AlertType::NewDevice,
        device_mac: Some("AA:BB:CC:DD:EE:01".to_string()),
        device_ip: Some("192.168.1.11".to_string()),
        message: format!("New device discovered (alert {})", id),
        severity: AlertSeverity::Warning,
        is_read,
    }
}

pub fn running_status(phase: &str, scan_count: u32) -> MonitoringStatus {
    MonitoringStatus {
        is_running: true,
        interval_seconds: 60,
        scan_count,
        last_scan_time: None,
        devices_online: 4,
        devices_total: 4,
        current_phase: Some(phase.to_string()),
    }
}

pub fn stopped_status(phase: Option<&str>, scan_count: u32) -> MonitoringStatus {
    MonitoringStatus {
        is_running: false,
        interval_seconds: 60,
        scan_count,
        last_scan_time: None,
        devices_online: 4,
        devices_total: 4,
        current_phase: phase.map(str::to_string),
    }
}
