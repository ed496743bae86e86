// [libs/infra/ssrf-guard/src/dns.rs]
//! DNS resolution seam (spec S4.4 step 5). Injectable so tests can pin a
//! hostname to an arbitrary address set without touching the network.

use async_trait::async_trait;
use std::net::IpAddr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DnsError {
    #[error("DNS resolution timed out")]
    Timeout,
    #[error("DNS resolution failed: {0}")]
    ResolutionFailed(String),
    #[error("DNS resolution returned no records")]
    NoRecords,
}

#[async_trait]
pub trait DnsResolver: Send + Sync {
    /// Resolves `hostname` to every A/AAAA record within `timeout`.
    async fn resolve(&self, hostname: &str, timeout: Duration) -> Result<Vec<IpAddr>, DnsError>;
}

pub struct TokioDnsResolver;

#[async_trait]
impl DnsResolver for TokioDnsResolver {
    async fn resolve(&self, hostname: &str, timeout: Duration) -> Result<Vec<IpAddr>, DnsError> {
        let lookup = tokio::time::timeout(timeout, tokio::net::lookup_host((hostname, 0)))
            .await
            .map_err(|_| DnsError::Timeout)?
            .map_err(|e| DnsError::ResolutionFailed(e.to_string()))?;

        let ips: Vec<IpAddr> = lookup.map(|socket_addr| socket_addr.ip()).collect();
        if ips.is_empty() {
            Err(DnsError::NoRecords)
        } else {
            Ok(ips)
        }
    }
}

#[cfg(test)]
pub mod fixed {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Test resolver: a fixed hostname → IP-set table, no network I/O.
    #[derive(Default)]
    pub struct FixedDnsResolver {
        records: Mutex<HashMap<String, Vec<IpAddr>>>,
    }

    impl FixedDnsResolver {
        pub fn with_record(hostname: &str, ips: Vec<IpAddr>) -> Self {
            let resolver = Self::default();
            resolver.records.lock().unwrap().insert(hostname.to_string(), ips);
            resolver
        }
    }

    #[async_trait]
    impl DnsResolver for FixedDnsResolver {
        async fn resolve(&self, hostname: &str, _timeout: Duration) -> Result<Vec<IpAddr>, DnsError> {
            self.records.lock().unwrap().get(hostname).cloned().ok_or(DnsError::NoRecords)
        }
    }
}
