use reqwest::{Client, ClientBuilder};
use std::{sync::Arc, time::Duration};
use tokio::sync::Semaphore;

use crate::rpc::errors::RpcError;

/// Configuration for HTTP client concurrency behavior.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Maximum number of concurrent HTTP requests allowed
    pub concurrent_limit: usize,
    /// Connect timeout for new sockets
    pub connect_timeout: Duration,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self { concurrent_limit: 256, connect_timeout: Duration::from_secs(5) }
    }
}

/// HTTP client with semaphore-based concurrency control.
///
/// One shared instance serves every endpoint; reqwest pools connections per
/// host underneath. Transient failures (transport errors, 5xx) are retried
/// a bounded number of times with a short backoff before the error is
/// surfaced to the caller.
pub struct HttpClient {
    client: Client,
    concurrent_limit: Arc<Semaphore>,
}

// Default is intentionally NOT implemented because HttpClient::new() can fail.

impl HttpClient {
    /// Creates a new HTTP client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to build.
    pub fn new() -> Result<Self, RpcError> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Creates a new HTTP client with the provided configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to build.
    pub fn with_config(config: HttpClientConfig) -> Result<Self, RpcError> {
        let client = ClientBuilder::new()
            .pool_idle_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(32)
            .connect_timeout(config.connect_timeout)
            .use_rustls_tls()
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(concat!("multirpc/", env!("CARGO_PKG_VERSION")))
            .tcp_keepalive(Duration::from_secs(30))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| {
                tracing::error!(error = %e, "failed to build http client");
                RpcError::ConnectionFailed(format!("http client build failed: {e}"))
            })?;

        Ok(Self { client, concurrent_limit: Arc::new(Semaphore::new(config.concurrent_limit)) })
    }

    /// Sanitizes network errors to prevent information disclosure.
    fn sanitize_network_error(error: &reqwest::Error) -> String {
        if error.is_connect() {
            "connection refused or unreachable".to_string()
        } else if error.is_timeout() {
            "connection timed out".to_string()
        } else if error.is_request() {
            "request failed".to_string()
        } else if error.is_body() {
            "response body error".to_string()
        } else if error.is_decode() {
            "response decode error".to_string()
        } else {
            "network error".to_string()
        }
    }

    /// Sends an HTTP POST with a JSON body and the given per-request timeout.
    ///
    /// # Errors
    ///
    /// - [`RpcError::Timeout`] if the request times out
    /// - [`RpcError::ConnectionFailed`] for transport-level failures
    /// - [`RpcError::Http`] for non-success HTTP status codes
    /// - [`RpcError::Network`] for body-read failures
    pub async fn send_request(
        &self,
        url: &str,
        body: bytes::Bytes,
        timeout: Duration,
    ) -> Result<bytes::Bytes, RpcError> {
        const MAX_RETRIES: u32 = 2;

        let _permit = Arc::clone(&self.concurrent_limit)
            .acquire_owned()
            .await
            .map_err(|_| RpcError::ConnectionFailed("http client shut down".to_string()))?;

        let mut retries = 0;

        loop {
            let result = self
                .client
                .post(url)
                .header("content-type", "application/json")
                // Bytes::clone() is O(1), so retries reuse the body without copying
                .body(body.clone())
                .timeout(timeout)
                .send()
                .await;

            match result {
                Ok(response) => {
                    if response.status().is_success() {
                        return response.bytes().await.map_err(RpcError::Network);
                    } else if response.status().is_server_error() && retries < MAX_RETRIES {
                        retries += 1;
                        tokio::time::sleep(Duration::from_millis(100 * (1 << retries))).await;
                        continue;
                    }

                    let status = response.status().as_u16();
                    let raw_text = response.text().await.unwrap_or_default();
                    let sanitized_text = if raw_text.len() > 256 {
                        format!("{}... (truncated)", &raw_text[..256])
                    } else {
                        raw_text
                    };
                    return Err(RpcError::Http(status, sanitized_text));
                }
                Err(_e) if retries < MAX_RETRIES => {
                    retries += 1;
                    tokio::time::sleep(Duration::from_millis(100 * (1 << retries))).await;
                }
                Err(e) => {
                    if e.is_timeout() {
                        return Err(RpcError::Timeout);
                    }
                    return Err(RpcError::ConnectionFailed(Self::sanitize_network_error(&e)));
                }
            }
        }
    }

    #[cfg(test)]
    #[must_use]
    pub fn available_permits(&self) -> usize {
        self.concurrent_limit.available_permits()
    }
}
