#![cfg(test)]
// [libs/infra/live-data/src/testutil.rs]
//! Shared fixtures for fetcher tests: a `SecureTransport` wired to a fixed
//! DNS answer and a scripted JSON body, so every provider's tests exercise
//! the real Guard+Transport path without a socket.

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use novaos_secure_transport::{RawResponse, SecureTransport, TransportError, TransportExecutor};
use novaos_ssrf_guard::{DnsError, DnsResolver, NoopRateLimitGate, SsrfGuard, SsrfGuardConfig};

struct FixedDnsResolver {
    host: String,
    ip: IpAddr,
}

#[async_trait]
impl DnsResolver for FixedDnsResolver {
    async fn resolve(&self, hostname: &str, _timeout: Duration) -> Result<Vec<IpAddr>, DnsError> {
        if hostname == self.host {
            Ok(vec![self.ip])
        } else {
            Err(DnsError::NoRecords)
        }
    }
}

struct JsonExecutor {
    body: Vec<u8>,
}

#[async_trait]
impl TransportExecutor for JsonExecutor {
    async fn execute(&self, _requirements: &novaos_models::TransportRequirements) -> Result<RawResponse, TransportError> {
        Ok(RawResponse { status_code: 200, body: self.body.clone(), truncated: false, location: None })
    }
}

pub(crate) fn transport_with_json_response(host: &str, json_body: &str) -> SecureTransport {
    let ip = IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34));
    let guard = Arc::new(SsrfGuard::new(SsrfGuardConfig::default(), Arc::new(FixedDnsResolver { host: host.to_string(), ip }), Arc::new(NoopRateLimitGate)));
    let executor = Arc::new(JsonExecutor { body: json_body.as_bytes().to_vec() });
    SecureTransport::new(guard, executor)
}
