//! HTTP implementation of the backend boundary
//!
//! Thin REST client over the engine's console API. Rejections (4xx) and
//! transport failures map onto the boundary error taxonomy; response bodies
//! are decoded straight into the shared record types.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::config::REMOTE_TIMEOUT;
use crate::models::{AlertRecord, DeviceRecord, NetworkStats, ScanRecord};
use crate::remote::{RemoteBoundary, RemoteError, RemoteFuture};
use crate::sync::MonitoringStatus;

#[derive(Debug, Clone)]
pub struct HttpBoundary {
    client: Client,
    base_url: String,
}

fn transport(err: reqwest::Error) -> RemoteError {
    RemoteError::Transport(err.to_string())
}

impl HttpBoundary {
    pub fn new(base_url: impl Into<String>) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(REMOTE_TIMEOUT)
            .build()
            .map_err(transport)?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = format!("{}: {}", status, body.trim());
        if status.is_client_error() {
            Err(RemoteError::Rejected(message))
        } else {
            Err(RemoteError::Transport(message))
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, RemoteError> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(transport)?;
        let response = Self::check(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|err| RemoteError::Transport(format!("invalid response body: {}", err)))
    }

    async fn post(&self, path: &str, body: Option<serde_json::Value>) -> Result<(), RemoteError> {
        let mut request = self.client.post(self.url(path));
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await.map_err(transport)?;
        Self::check(response).await?;
        Ok(())
    }
}

impl RemoteBoundary for HttpBoundary {
    fn get_network_stats(&self) -> RemoteFuture<'_, NetworkStats> {
        Box::pin(async move { self.get_json("/api/stats").await })
    }

    fn get_scan_history(&self, limit: u32) -> RemoteFuture<'_, Vec<ScanRecord>> {
        Box::pin(async move { self.get_json(&format!("/api/scans?limit={}", limit)).await })
    }

    fn get_all_devices(&self) -> RemoteFuture<'_, Vec<DeviceRecord>> {
        Box::pin(async move { self.get_json("/api/devices").await })
    }

    fn update_device_name(&self, mac: String, name: String) -> RemoteFuture<'_, ()> {
        Box::pin(async move {
            self.post(
                &format!("/api/devices/{}/name", mac),
                Some(json!({ "name": name })),
            )
            .await
        })
    }

    fn get_unread_alerts(&self) -> RemoteFuture<'_, Vec<AlertRecord>> {
        Box::pin(async move { self.get_json("/api/alerts/unread").await })
    }

    fn mark_alert_read(&self, alert_id: i64) -> RemoteFuture<'_, ()> {
        Box::pin(async move {
            self.post(&format!("/api/alerts/{}/read", alert_id), None)
                .await
        })
    }

    fn mark_all_alerts_read(&self) -> RemoteFuture<'_, ()> {
        Box::pin(async move { self.post("/api/alerts/read-all", None).await })
    }

    fn start_monitoring(&self, interval_seconds: u64) -> RemoteFuture<'_, ()> {
        Box::pin(async move {
            self.post(
                "/api/monitoring/start",
                Some(json!({ "interval_seconds": interval_seconds })),
            )
            .await
        })
    }

    fn stop_monitoring(&self) -> RemoteFuture<'_, ()> {
        Box::pin(async move { self.post("/api/monitoring/stop", None).await })
    }

    fn get_monitoring_status(&self) -> RemoteFuture<'_, MonitoringStatus> {
        Box::pin(async move { self.get_json("/api/monitoring/status").await })
    }
}
