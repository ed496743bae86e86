// [libs/infra/ssrf-guard/src/config.rs]
//! Guard configuration (spec S6 "ssrf" config section): allowed ports,
//! blocklist/allowlist, timeouts, redirect and byte caps.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SsrfGuardConfig {
    pub allowed_ports: HashSet<u16>,
    pub hostname_allowlist: HashSet<String>,
    pub hostname_blocklist: HashSet<String>,
    pub dns_timeout: Duration,
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    pub max_response_bytes: usize,
    pub max_redirects: u8,
    pub certificate_pins: HashMap<String, Vec<String>>,
    pub user_agent: String,
}

impl Default for SsrfGuardConfig {
    fn default() -> Self {
        Self {
            allowed_ports: [80, 443].into_iter().collect(),
            hostname_allowlist: HashSet::new(),
            hostname_blocklist: HashSet::new(),
            dns_timeout: Duration::from_secs(3),
            connect_timeout_ms: 3_000,
            read_timeout_ms: 8_000,
            max_response_bytes: 2 * 1024 * 1024,
            max_redirects: 3,
            certificate_pins: HashMap::new(),
            user_agent: "NovaOS-Evidence-Uplink/1.0".to_string(),
        }
    }
}
