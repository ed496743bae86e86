// [libs/infra/ssrf-guard/src/guard.rs]
//! The ordered check sequence (spec S4.4): the first failing check
//! short-circuits to a denied [`SsrfDecision`] carrying a specific reason.
//! Nothing downstream of this module may perform an outbound fetch without
//! first obtaining an `allowed` decision from here.

use novaos_models::{SsrfCheck, SsrfDecision, TransportRequirements};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Instant;
use url::Url;

use crate::config::SsrfGuardConfig;
use crate::dns::DnsResolver;
use crate::hostname::normalize_hostname;
use crate::ip_classify::classify_ip;
use crate::rate_limit::RateLimitGate;

pub struct SsrfGuard {
    config: SsrfGuardConfig,
    dns_resolver: Arc<dyn DnsResolver>,
    rate_limiter: Arc<dyn RateLimitGate>,
}

impl SsrfGuard {
    pub fn new(config: SsrfGuardConfig, dns_resolver: Arc<dyn DnsResolver>, rate_limiter: Arc<dyn RateLimitGate>) -> Self {
        Self { config, dns_resolver, rate_limiter }
    }

    pub async fn evaluate(&self, raw_url: &str, rate_limit_key: &str, request_id: Option<String>) -> SsrfDecision {
        let started = Instant::now();
        let mut checks: Vec<SsrfCheck> = Vec::new();
        let elapsed = |started: Instant| started.elapsed().as_millis() as u64;

        if !self.rate_limiter.check_and_consume(rate_limit_key).await {
            checks.push(SsrfCheck { check_type: "rate_limit".into(), passed: false, details: rate_limit_key.to_string() });
            return Self::stamp(SsrfDecision::denied("RATE_LIMITED", "Rate limit exceeded for this caller.", checks, elapsed(started)), request_id);
        }
        checks.push(SsrfCheck { check_type: "rate_limit".into(), passed: true, details: rate_limit_key.to_string() });

        let parsed = match Url::parse(raw_url) {
            Ok(url) => url,
            Err(e) => {
                checks.push(SsrfCheck { check_type: "url_parse".into(), passed: false, details: e.to_string() });
                return Self::stamp(SsrfDecision::denied("MALFORMED_URL", "The URL could not be parsed.", checks, elapsed(started)), request_id);
            }
        };

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            checks.push(SsrfCheck { check_type: "scheme".into(), passed: false, details: parsed.scheme().to_string() });
            return Self::stamp(SsrfDecision::denied("INVALID_SCHEME", "Only http/https are permitted.", checks, elapsed(started)), request_id);
        }
        if !parsed.username().is_empty() || parsed.password().is_some() {
            checks.push(SsrfCheck { check_type: "userinfo".into(), passed: false, details: "userinfo present in URL".into() });
            return Self::stamp(SsrfDecision::denied("USERINFO_PRESENT", "URLs with embedded credentials are rejected.", checks, elapsed(started)), request_id);
        }
        let port = parsed.port_or_known_default().unwrap_or(0);
        if !self.config.allowed_ports.contains(&port) {
            checks.push(SsrfCheck { check_type: "port".into(), passed: false, details: port.to_string() });
            return Self::stamp(SsrfDecision::denied("PORT_NOT_ALLOWED", "The requested port is not permitted.", checks, elapsed(started)), request_id);
        }
        checks.push(SsrfCheck { check_type: "url_structure".into(), passed: true, details: format!("scheme={} port={}", parsed.scheme(), port) });

        let Some(host_str) = parsed.host_str() else {
            checks.push(SsrfCheck { check_type: "hostname".into(), passed: false, details: "no host present".into() });
            return Self::stamp(SsrfDecision::denied("NO_HOST", "The URL has no host component.", checks, elapsed(started)), request_id);
        };

        let normalized_host = match normalize_hostname(host_str) {
            Ok(host) => host,
            Err(e) => {
                checks.push(SsrfCheck { check_type: "hostname".into(), passed: false, details: e.to_string() });
                return Self::stamp(SsrfDecision::denied("ALTERNATE_IP_ENCODING", "The hostname uses a disguised IP encoding.", checks, elapsed(started)), request_id);
            }
        };
        checks.push(SsrfCheck { check_type: "hostname".into(), passed: true, details: normalized_host.clone() });

        if self.config.hostname_blocklist.contains(&normalized_host) {
            checks.push(SsrfCheck { check_type: "blocklist".into(), passed: false, details: normalized_host.clone() });
            return Self::stamp(SsrfDecision::denied("HOSTNAME_BLOCKED", "This destination is blocked by policy.", checks, elapsed(started)), request_id);
        }
        if !self.config.hostname_allowlist.is_empty() && !self.config.hostname_allowlist.contains(&normalized_host) {
            checks.push(SsrfCheck { check_type: "allowlist".into(), passed: false, details: normalized_host.clone() });
            return Self::stamp(SsrfDecision::denied("HOSTNAME_NOT_ALLOWLISTED", "This destination is not on the allowed list.", checks, elapsed(started)), request_id);
        }
        checks.push(SsrfCheck { check_type: "domain_policy".into(), passed: true, details: normalized_host.clone() });

        let resolved_ips: Vec<IpAddr> = if let Ok(literal) = normalized_host.parse::<IpAddr>() {
            vec![literal]
        } else {
            match self.dns_resolver.resolve(&normalized_host, self.config.dns_timeout).await {
                Ok(ips) => ips,
                Err(e) => {
                    checks.push(SsrfCheck { check_type: "dns".into(), passed: false, details: e.to_string() });
                    return Self::stamp(SsrfDecision::denied("DNS_FAILURE", "The hostname could not be resolved.", checks, elapsed(started)), request_id);
                }
            }
        };

        for ip in &resolved_ips {
            let classification = classify_ip(*ip);
            if !classification.is_public() {
                checks.push(SsrfCheck { check_type: "ip_classification".into(), passed: false, details: format!("{ip} classified as {}", classification.reason_code()) });
                return Self::stamp(SsrfDecision::denied(classification.reason_code(), "A resolved address is not publicly routable.", checks, elapsed(started)), request_id);
            }
        }
        checks.push(SsrfCheck { check_type: "ip_classification".into(), passed: true, details: format!("{} address(es), all public", resolved_ips.len()) });

        let connect_to_ip = resolved_ips[0];
        let certificate_pins = self.config.certificate_pins.get(&normalized_host).cloned();
        let request_path = if parsed.query().is_some() {
            format!("{}?{}", parsed.path(), parsed.query().unwrap())
        } else {
            parsed.path().to_string()
        };

        let transport = TransportRequirements {
            connect_to_ip,
            port,
            use_tls: parsed.scheme() == "https",
            hostname: normalized_host,
            request_path,
            max_response_bytes: self.config.max_response_bytes,
            connect_timeout_ms: self.config.connect_timeout_ms,
            read_timeout_ms: self.config.read_timeout_ms,
            allow_redirects: true,
            max_redirects: self.config.max_redirects,
            certificate_pins,
            headers: Vec::new(),
            user_agent: self.config.user_agent.clone(),
        };

        Self::stamp(SsrfDecision::allowed(transport, checks, elapsed(started)), request_id)
    }

    fn stamp(mut decision: SsrfDecision, request_id: Option<String>) -> SsrfDecision {
        decision.request_id = request_id;
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::fixed::FixedDnsResolver;
    use crate::rate_limit::NoopRateLimitGate;
    use std::net::Ipv4Addr;

    fn guard_with_records(hostname: &str, ips: Vec<IpAddr>) -> SsrfGuard {
        SsrfGuard::new(
            SsrfGuardConfig::default(),
            Arc::new(FixedDnsResolver::with_record(hostname, ips)),
            Arc::new(NoopRateLimitGate),
        )
    }

    #[tokio::test]
    async fn public_ip_is_allowed_and_pinned_exactly() {
        let guard = guard_with_records("example.com", vec![IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34))]);
        let decision = guard.evaluate("https://example.com/data", "user-1", Some("req-1".into())).await;
        assert!(decision.allowed);
        let transport = decision.transport.unwrap();
        assert_eq!(transport.connect_to_ip, IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34)));
        assert_eq!(transport.hostname, "example.com");
    }

    #[tokio::test]
    async fn private_resolved_ip_is_denied() {
        let guard = guard_with_records("internal.example.com", vec![IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5))]);
        let decision = guard.evaluate("https://internal.example.com/", "user-1", None).await;
        assert!(!decision.allowed);
        assert_eq!(decision.reason.as_deref(), Some("PRIVATE_IP"));
        assert!(decision.transport.is_none());
    }

    #[tokio::test]
    async fn metadata_service_literal_ip_is_denied_without_dns() {
        let guard = guard_with_records("unused", vec![]);
        let decision = guard.evaluate("http://169.254.169.254/latest/meta-data", "user-1", None).await;
        assert!(!decision.allowed);
        assert_eq!(decision.reason.as_deref(), Some("METADATA_IP"));
    }

    #[tokio::test]
    async fn disallowed_scheme_is_rejected() {
        let guard = guard_with_records("example.com", vec![IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1))]);
        let decision = guard.evaluate("ftp://example.com/", "user-1", None).await;
        assert!(!decision.allowed);
        assert_eq!(decision.reason.as_deref(), Some("INVALID_SCHEME"));
    }

    #[tokio::test]
    async fn disallowed_port_is_rejected() {
        let guard = guard_with_records("example.com", vec![IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1))]);
        let decision = guard.evaluate("https://example.com:8081/", "user-1", None).await;
        assert!(!decision.allowed);
        assert_eq!(decision.reason.as_deref(), Some("PORT_NOT_ALLOWED"));
    }

    #[tokio::test]
    async fn disguised_ip_hostname_is_rejected() {
        let guard = guard_with_records("unused", vec![]);
        let decision = guard.evaluate("http://2130706433/", "user-1", None).await;
        assert!(!decision.allowed);
        assert_eq!(decision.reason.as_deref(), Some("ALTERNATE_IP_ENCODING"));
    }

    #[tokio::test]
    async fn blocklisted_hostname_is_rejected() {
        let mut config = SsrfGuardConfig::default();
        config.hostname_blocklist.insert("blocked.example.com".to_string());
        let guard = SsrfGuard::new(config, Arc::new(FixedDnsResolver::with_record("blocked.example.com", vec![IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1))])), Arc::new(NoopRateLimitGate));
        let decision = guard.evaluate("https://blocked.example.com/", "user-1", None).await;
        assert!(!decision.allowed);
        assert_eq!(decision.reason.as_deref(), Some("HOSTNAME_BLOCKED"));
    }
}
