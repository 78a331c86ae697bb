//! Backend record vocabulary shared with the NEXUS discovery engine
//!
//! These shapes mirror what the engine serves over the RPC boundary.
//! Collections of them are replaced wholesale on refetch, never patched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One completed scan, as recorded by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRecord {
    pub id: i64,
    pub scan_time: DateTime<Utc>,
    pub interface_name: String,
    pub local_ip: String,
    pub subnet: String,
    pub scan_method: String,
    pub arp_discovered: i64,
    pub icmp_discovered: i64,
    pub total_hosts: i64,
    pub duration_ms: i64,
}

/// A discovered network host, identified by hardware address.
///
/// The `mac` is the identity key across scans; `id` is the backend's row id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub id: i64,
    pub mac: String,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub last_ip: Option<String>,
    pub vendor: Option<String>,
    pub device_type: Option<String>,
    pub hostname: Option<String>,
    pub custom_name: Option<String>,
}

impl DeviceRecord {
    /// Preferred display label: custom name, then hostname, then MAC.
    pub fn display_name(&self) -> &str {
        self.custom_name
            .as_deref()
            .or(self.hostname.as_deref())
            .unwrap_or(&self.mac)
    }
}

/// A notable event tied optionally to a device.
///
/// `is_read` only ever transitions false -> true on the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRecord {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub alert_type: AlertType,
    pub device_mac: Option<String>,
    pub device_ip: Option<String>,
    pub message: String,
    pub severity: AlertSeverity,
    pub is_read: bool,
}

/// Alert types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    NewDevice,
    DeviceOffline,
    DeviceOnline,
    HighRisk,
    PortChange,
    IpChange,
    Custom,
}

impl std::fmt::Display for AlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertType::NewDevice => write!(f, "new_device"),
            AlertType::DeviceOffline => write!(f, "device_offline"),
            AlertType::DeviceOnline => write!(f, "device_online"),
            AlertType::HighRisk => write!(f, "high_risk"),
            AlertType::PortChange => write!(f, "port_change"),
            AlertType::IpChange => write!(f, "ip_change"),
            AlertType::Custom => write!(f, "custom"),
        }
    }
}

impl std::str::FromStr for AlertType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new_device" => Ok(AlertType::NewDevice),
            "device_offline" => Ok(AlertType::DeviceOffline),
            "device_online" => Ok(AlertType::DeviceOnline),
            "high_risk" => Ok(AlertType::HighRisk),
            "port_change" => Ok(AlertType::PortChange),
            "ip_change" => Ok(AlertType::IpChange),
            "custom" => Ok(AlertType::Custom),
            _ => Err(format!("Unknown alert type: {}", s)),
        }
    }
}

/// Alert severity levels
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertSeverity::Info => write!(f, "info"),
            AlertSeverity::Warning => write!(f, "warning"),
            AlertSeverity::Error => write!(f, "error"),
            AlertSeverity::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for AlertSeverity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(AlertSeverity::Info),
            "warning" => Ok(AlertSeverity::Warning),
            "error" => Ok(AlertSeverity::Error),
            "critical" => Ok(AlertSeverity::Critical),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

/// Aggregate dashboard snapshot. Derived on the backend; always replaced
/// wholesale on refetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkStats {
    pub total_devices: i64,
    pub online_devices: i64,
    pub offline_devices: i64,
    pub new_devices_24h: i64,
    pub high_risk_devices: i64,
    pub total_scans: i64,
    pub last_scan_time: Option<DateTime<Utc>>,
}

/// Normalize a MAC address to the canonical `AA:BB:CC:DD:EE:FF` form.
///
/// Accepts `:` or `-` separators in any case. Returns `None` when the input
/// is not six octets of two hex digits.
pub fn normalize_mac(raw: &str) -> Option<String> {
    let octets: Vec<&str> = raw.split([':', '-']).collect();
    if octets.len() != 6 {
        return None;
    }
    for octet in &octets {
        if octet.len() != 2 || !octet.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
    }
    Some(
        octets
            .iter()
            .map(|o| o.to_ascii_uppercase())
            .collect::<Vec<_>>()
            .join(":"),
    )
}
