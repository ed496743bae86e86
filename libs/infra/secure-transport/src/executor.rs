// [libs/infra/secure-transport/src/executor.rs]
//! The one seam that actually touches a socket. `TransportExecutor` exists
//! so `SecureTransport`'s hop loop is unit-testable against a fake without
//! a real network.

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use novaos_models::TransportRequirements;
use reqwest::redirect::Policy;

use crate::errors::TransportError;

#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status_code: u16,
    pub body: Vec<u8>,
    pub truncated: bool,
    pub location: Option<String>,
}

#[async_trait]
pub trait TransportExecutor: Send + Sync {
    async fn execute(&self, requirements: &TransportRequirements) -> Result<RawResponse, TransportError>;
}

/// Builds a short-lived `reqwest::Client` per call, pinned via `.resolve()`
/// to the exact IP the Guard selected. The request URL still names the
/// hostname, so `Host` and the TLS SNI are exactly `hostname` (spec S4.4's
/// transport contract) while the socket itself can only ever reach
/// `connect_to_ip:port` — this is the DNS-rebinding defense: nothing in
/// this executor performs a second DNS lookup. Redirects are disabled at
/// the client level; `SecureTransport` owns the hop loop instead.
pub struct ReqwestTransportExecutor;

impl ReqwestTransportExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ReqwestTransportExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransportExecutor for ReqwestTransportExecutor {
    async fn execute(&self, requirements: &TransportRequirements) -> Result<RawResponse, TransportError> {
        let socket_addr = SocketAddr::new(requirements.connect_to_ip, requirements.port);

        let client = reqwest::Client::builder()
            .resolve(&requirements.hostname, socket_addr)
            .redirect(Policy::none())
            .connect_timeout(Duration::from_millis(requirements.connect_timeout_ms))
            .timeout(Duration::from_millis(requirements.connect_timeout_ms + requirements.read_timeout_ms))
            .user_agent(&requirements.user_agent)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let scheme = if requirements.use_tls { "https" } else { "http" };
        let url = format!("{scheme}://{}{}", requirements.hostname, requirements.request_path);

        let mut request = client.get(&url);
        for (name, value) in &requirements.headers {
            request = request.header(name, value);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout
            } else {
                TransportError::Network(e.to_string())
            }
        })?;

        let status_code = response.status().as_u16();
        let location = response.headers().get(reqwest::header::LOCATION).and_then(|v| v.to_str().ok()).map(|s| s.to_string());

        let max_bytes = requirements.max_response_bytes;
        let mut body = Vec::new();
        let mut truncated = false;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| TransportError::Network(e.to_string()))?;
            if body.len() + chunk.len() > max_bytes {
                let remaining = max_bytes.saturating_sub(body.len());
                body.extend_from_slice(&chunk[..remaining]);
                truncated = true;
                break;
            }
            body.extend_from_slice(&chunk);
        }

        Ok(RawResponse { status_code, body, truncated, location })
    }
}
