// [libs/infra/secure-transport/src/transport.rs]
//! The redirect-chain orchestrator (spec S4.4): each hop is a fresh Guard
//! decision, never a raw socket follow. `SecureTransport` owns the visited-
//! URL set and the hop cap so a misbehaving or hostile origin can't loop or
//! exhaust the chain.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use novaos_kvs::KeyValueStore;
use novaos_models::{RedirectHop, TransportEvidence};
use novaos_ssrf_guard::SsrfGuard;
use url::Url;

use crate::errors::TransportError;
use crate::executor::TransportExecutor;

#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub body: Vec<u8>,
    pub evidence: TransportEvidence,
    pub hops: Vec<RedirectHop>,
}

pub struct SecureTransport {
    guard: Arc<SsrfGuard>,
    executor: Arc<dyn TransportExecutor>,
    source_health: Option<Arc<dyn KeyValueStore>>,
}

impl SecureTransport {
    pub fn new(guard: Arc<SsrfGuard>, executor: Arc<dyn TransportExecutor>) -> Self {
        Self { guard, executor, source_health: None }
    }

    /// Opts this transport into `lens:source:{id}` bookkeeping (spec S4.10
    /// supplement): every call's success/failure feeds the consecutive-
    /// failure counter the `known_sources_health` job later reads.
    pub fn with_source_health(mut self, kvs: Arc<dyn KeyValueStore>) -> Self {
        self.source_health = Some(kvs);
        self
    }

    /// Fetches `initial_url`, re-invoking the Guard for every redirect hop.
    /// The redirect cap is fixed at the *first* decision's `max_redirects`
    /// so a redirected-to host can't relax the policy for its own hop.
    pub async fn fetch(&self, initial_url: &str, rate_limit_key: &str, request_id: Option<String>) -> Result<FetchOutcome, TransportError> {
        let result = self.fetch_inner(initial_url, rate_limit_key, request_id).await;
        self.record_health(rate_limit_key, result.is_ok()).await;
        result
    }

    async fn record_health(&self, rate_limit_key: &str, success: bool) {
        if let Some(kvs) = &self.source_health {
            let source_id = rate_limit_key.split(':').nth(1).unwrap_or(rate_limit_key);
            crate::source_health::record_outcome(kvs, source_id, success).await;
        }
    }

    async fn fetch_inner(&self, initial_url: &str, rate_limit_key: &str, request_id: Option<String>) -> Result<FetchOutcome, TransportError> {
        let started = Instant::now();
        let mut visited: HashSet<String> = HashSet::new();
        let mut hops: Vec<RedirectHop> = Vec::new();
        let mut current_url = initial_url.to_string();
        let mut max_redirects: Option<u8> = None;

        loop {
            let decision = self.guard.evaluate(&current_url, rate_limit_key, request_id.clone()).await;
            if !decision.allowed {
                return Err(TransportError::SsrfDenied(decision.reason.unwrap_or(decision.message)));
            }
            let requirements = decision.transport.expect("allowed decision always carries transport requirements");
            let cap = *max_redirects.get_or_insert(requirements.max_redirects);

            visited.insert(current_url.clone());
            let raw = self.executor.execute(&requirements).await?;

            let is_redirect = (300..400).contains(&raw.status_code) && requirements.allow_redirects;
            if !is_redirect {
                let evidence = TransportEvidence {
                    connected_ip: requirements.connect_to_ip,
                    connected_port: requirements.port,
                    certificate_pins_verified: requirements.certificate_pins.as_ref().map(|_| true),
                    bytes_received: raw.body.len(),
                    truncated: raw.truncated,
                    status_code: Some(raw.status_code),
                    duration_ms: started.elapsed().as_millis() as u64,
                };
                return Ok(FetchOutcome { body: raw.body, evidence, hops });
            }

            let location = raw.location.ok_or(TransportError::MissingRedirectLocation)?;
            let next_url = resolve_location(&current_url, &location)?;

            if visited.contains(&next_url) {
                return Err(TransportError::RedirectLoopDetected(next_url));
            }
            if hops.len() >= cap as usize {
                return Err(TransportError::RedirectCapExceeded(cap));
            }

            hops.push(RedirectHop { from_url: current_url.clone(), to_url: next_url.clone(), status_code: raw.status_code });
            current_url = next_url;
        }
    }
}

fn resolve_location(current_url: &str, location: &str) -> Result<String, TransportError> {
    let base = Url::parse(current_url).map_err(|e| TransportError::MalformedRedirectLocation(e.to_string()))?;
    let resolved = base.join(location).map_err(|e| TransportError::MalformedRedirectLocation(e.to_string()))?;
    Ok(resolved.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use novaos_ssrf_guard::{DnsResolver, NoopRateLimitGate, SsrfGuardConfig};
    use std::collections::HashMap;
    use std::net::{IpAddr, Ipv4Addr};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::Mutex as AsyncMutex;

    struct FixedDnsResolver {
        records: HashMap<String, Vec<IpAddr>>,
    }

    #[async_trait]
    impl DnsResolver for FixedDnsResolver {
        async fn resolve(&self, hostname: &str, _timeout: Duration) -> Result<Vec<IpAddr>, novaos_ssrf_guard::DnsError> {
            self.records.get(hostname).cloned().ok_or(novaos_ssrf_guard::DnsError::NoRecords)
        }
    }

    struct ScriptedExecutor {
        responses: AsyncMutex<std::collections::VecDeque<crate::executor::RawResponse>>,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TransportExecutor for ScriptedExecutor {
        async fn execute(&self, requirements: &novaos_models::TransportRequirements) -> Result<crate::executor::RawResponse, TransportError> {
            self.calls.lock().unwrap().push(requirements.hostname.clone());
            self.responses.lock().await.pop_front().ok_or(TransportError::Network("no scripted response left".to_string()))
        }
    }

    fn guard(records: &[(&str, IpAddr)]) -> Arc<SsrfGuard> {
        let mut table = HashMap::new();
        for (host, ip) in records {
            table.insert(host.to_string(), vec![*ip]);
        }
        Arc::new(SsrfGuard::new(SsrfGuardConfig::default(), Arc::new(FixedDnsResolver { records: table }), Arc::new(NoopRateLimitGate)))
    }

    fn ok_response(body: &str) -> crate::executor::RawResponse {
        crate::executor::RawResponse { status_code: 200, body: body.as_bytes().to_vec(), truncated: false, location: None }
    }

    fn redirect_response(location: &str) -> crate::executor::RawResponse {
        crate::executor::RawResponse { status_code: 302, body: Vec::new(), truncated: false, location: Some(location.to_string()) }
    }

    #[tokio::test]
    async fn direct_success_returns_body_and_evidence() {
        let guard = guard(&[("example.com", IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34)))]);
        let executor = Arc::new(ScriptedExecutor { responses: AsyncMutex::new(vec![ok_response("hello")].into()), calls: Mutex::new(Vec::new()) });
        let transport = SecureTransport::new(guard, executor);

        let outcome = transport.fetch("https://example.com/data", "user-1", None).await.unwrap();
        assert_eq!(outcome.body, b"hello");
        assert_eq!(outcome.evidence.connected_ip, IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34)));
        assert!(outcome.hops.is_empty());
    }

    #[tokio::test]
    async fn redirect_hop_is_followed_after_a_fresh_guard_decision() {
        let guard = guard(&[
            ("a.example.com", IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1))),
            ("b.example.com", IpAddr::V4(Ipv4Addr::new(2, 2, 2, 2))),
        ]);
        let executor = Arc::new(ScriptedExecutor {
            responses: AsyncMutex::new(vec![redirect_response("https://b.example.com/final"), ok_response("final body")].into()),
            calls: Mutex::new(Vec::new()),
        });
        let transport = SecureTransport::new(guard, executor.clone());

        let outcome = transport.fetch("https://a.example.com/start", "user-1", None).await.unwrap();
        assert_eq!(outcome.body, b"final body");
        assert_eq!(outcome.hops.len(), 1);
        assert_eq!(outcome.hops[0].to_url, "https://b.example.com/final");
        assert_eq!(executor.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn redirect_to_a_denied_host_surfaces_ssrf_denied() {
        let guard = guard(&[("a.example.com", IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1)))]);
        let executor = Arc::new(ScriptedExecutor {
            responses: AsyncMutex::new(vec![redirect_response("http://169.254.169.254/latest/meta-data")].into()),
            calls: Mutex::new(Vec::new()),
        });
        let transport = SecureTransport::new(guard, executor);

        let result = transport.fetch("https://a.example.com/start", "user-1", None).await;
        assert!(matches!(result, Err(TransportError::SsrfDenied(_))));
    }

    #[tokio::test]
    async fn redirect_loop_is_detected() {
        let guard = guard(&[
            ("a.example.com", IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1))),
            ("b.example.com", IpAddr::V4(Ipv4Addr::new(2, 2, 2, 2))),
        ]);
        let executor = Arc::new(ScriptedExecutor {
            responses: AsyncMutex::new(
                vec![redirect_response("https://b.example.com/"), redirect_response("https://a.example.com/start")].into(),
            ),
            calls: Mutex::new(Vec::new()),
        });
        let transport = SecureTransport::new(guard, executor);

        let result = transport.fetch("https://a.example.com/start", "user-1", None).await;
        assert!(matches!(result, Err(TransportError::RedirectLoopDetected(_))));
    }

    #[tokio::test]
    async fn source_health_is_recorded_when_opted_in() {
        let kvs: Arc<dyn KeyValueStore> = Arc::new(novaos_kvs::MemoryStore::new());
        let guard = guard(&[("example.com", IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34)))]);
        let executor = Arc::new(ScriptedExecutor { responses: AsyncMutex::new(vec![ok_response("hello")].into()), calls: Mutex::new(Vec::new()) });
        let transport = SecureTransport::new(guard, executor).with_source_health(kvs.clone());

        transport.fetch("https://example.com/data", "live-data:stock:AAPL", None).await.unwrap();

        let bytes = kvs.get("lens:source:stock").await.expect("health record written");
        let health: novaos_models::SourceHealth = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(health.consecutive_failures, 0);
        assert_eq!(health.status, novaos_models::SourceStatus::Active);
    }

    #[tokio::test]
    async fn source_health_is_untouched_without_opt_in() {
        let guard = guard(&[("example.com", IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34)))]);
        let executor = Arc::new(ScriptedExecutor { responses: AsyncMutex::new(vec![ok_response("hello")].into()), calls: Mutex::new(Vec::new()) });
        let transport = SecureTransport::new(guard, executor);

        // No source_health sink configured: this must not panic, and there is
        // nothing to assert on since the transport holds no reference to any KVS.
        transport.fetch("https://example.com/data", "live-data:stock:AAPL", None).await.unwrap();
    }

    #[tokio::test]
    async fn redirect_cap_is_enforced() {
        let guard = guard(&[
            ("a.example.com", IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1))),
            ("b.example.com", IpAddr::V4(Ipv4Addr::new(2, 2, 2, 2))),
            ("c.example.com", IpAddr::V4(Ipv4Addr::new(3, 3, 3, 3))),
            ("d.example.com", IpAddr::V4(Ipv4Addr::new(4, 4, 4, 4))),
            ("e.example.com", IpAddr::V4(Ipv4Addr::new(5, 5, 5, 5))),
        ]);
        // SsrfGuardConfig::default() caps max_redirects at 3.
        let executor = Arc::new(ScriptedExecutor {
            responses: AsyncMutex::new(
                vec![
                    redirect_response("https://b.example.com/"),
                    redirect_response("https://c.example.com/"),
                    redirect_response("https://d.example.com/"),
                    redirect_response("https://e.example.com/"),
                ]
                .into(),
            ),
            calls: Mutex::new(Vec::new()),
        });
        let transport = SecureTransport::new(guard, executor);

        let result = transport.fetch("https://a.example.com/start", "user-1", None).await;
        assert!(matches!(result, Err(TransportError::RedirectCapExceeded(3))));
    }
}
