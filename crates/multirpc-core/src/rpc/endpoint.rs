use std::{sync::Arc, time::Instant};
use tokio::sync::RwLock;

use crate::rpc::client::RpcApi;

/// Last-known health of a single endpoint.
///
/// Routing never consults this (racing covers endpoint selection); it exists
/// so operators can see which endpoints have been misbehaving.
#[derive(Debug, Clone)]
pub struct EndpointHealth {
    pub is_healthy: bool,
    pub error_count: u32,
    pub response_time_ms: Option<u64>,
    pub last_check: Option<Instant>,
}

impl Default for EndpointHealth {
    fn default() -> Self {
        Self { is_healthy: true, error_count: 0, response_time_ms: None, last_check: None }
    }
}

/// A single RPC endpoint: a human-readable label, the URL it was configured
/// with, the client handle used to talk to it, and health bookkeeping.
pub struct Endpoint {
    name: Arc<str>,
    url: String,
    rpc: Arc<dyn RpcApi>,
    health: RwLock<EndpointHealth>,
}

impl Endpoint {
    #[must_use]
    pub fn new(url: impl Into<String>, rpc: Arc<dyn RpcApi>) -> Self {
        let url = url.into();
        let name = Arc::from(label_from_url(&url));
        Self { name, url, rpc, health: RwLock::new(EndpointHealth::default()) }
    }

    /// Label used in logs and observer events, derived from the URL host.
    #[must_use]
    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn rpc(&self) -> &Arc<dyn RpcApi> {
        &self.rpc
    }

    /// Returns the current health snapshot.
    pub async fn health(&self) -> EndpointHealth {
        self.health.read().await.clone()
    }

    /// Updates the health status based on request success or failure.
    ///
    /// Successful requests reset the error count. After 3 consecutive
    /// failures the endpoint is marked unhealthy.
    pub async fn update_health(&self, success: bool, response_time_ms: Option<u64>) {
        let mut health = self.health.write().await;
        health.last_check = Some(Instant::now());
        if response_time_ms.is_some() {
            health.response_time_ms = response_time_ms;
        }

        if success {
            health.error_count = 0;
            health.is_healthy = true;
        } else {
            health.error_count += 1;

            if health.error_count >= 3 {
                health.is_healthy = false;
                tracing::warn!(
                    endpoint = %self.name,
                    error_count = health.error_count,
                    "endpoint is unhealthy after consecutive errors"
                );
            }
        }
    }
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint").field("name", &self.name).field("url", &self.url).finish()
    }
}

/// Derives a log-friendly label from an endpoint URL: the host (plus port
/// when present), falling back to the raw string for unparsable input.
#[must_use]
pub fn label_from_url(url: &str) -> String {
    match reqwest::Url::parse(url) {
        Ok(parsed) => match (parsed.host_str(), parsed.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => url.to_string(),
        },
        Err(_) => url.to_string(),
    }
}
