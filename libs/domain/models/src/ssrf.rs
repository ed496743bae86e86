// [libs/domain/models/src/ssrf.rs]
//! Wire shapes shared between the SSRF Guard and Secure Transport crates
//! (spec S3 SSRFDecision / TransportRequirements, S4.4). Kept here — not in
//! either infra crate — so Guard and Transport never drift on the contract
//! between them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsrfCheck {
    pub check_type: String,
    pub passed: bool,
    pub details: String,
}

/// The sole authority Secure Transport consults before dialing out. Immutable
/// once produced: `allowed ⇔ transport.is_some()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsrfDecision {
    pub allowed: bool,
    pub reason: Option<String>,
    pub message: String,
    pub checks: Vec<SsrfCheck>,
    pub transport: Option<TransportRequirements>,
    pub duration_ms: u64,
    pub timestamp: DateTime<Utc>,
    pub request_id: Option<String>,
}

impl SsrfDecision {
    pub fn denied(reason: impl Into<String>, message: impl Into<String>, checks: Vec<SsrfCheck>, duration_ms: u64) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
            message: message.into(),
            checks,
            transport: None,
            duration_ms,
            timestamp: Utc::now(),
            request_id: None,
        }
    }

    pub fn allowed(transport: TransportRequirements, checks: Vec<SsrfCheck>, duration_ms: u64) -> Self {
        Self {
            allowed: true,
            reason: None,
            message: "allowed".to_string(),
            checks,
            transport: Some(transport),
            duration_ms,
            timestamp: Utc::now(),
            request_id: None,
        }
    }
}

/// Everything Secure Transport needs to perform the fetch. `connect_to_ip` is
/// pinned by the Guard; Transport MUST dial exactly this address (spec S4.4
/// DNS-rebinding defense) and MUST NOT re-resolve the hostname.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportRequirements {
    pub connect_to_ip: IpAddr,
    pub port: u16,
    pub use_tls: bool,
    pub hostname: String,
    pub request_path: String,
    pub max_response_bytes: usize,
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    pub allow_redirects: bool,
    pub max_redirects: u8,
    pub certificate_pins: Option<Vec<String>>,
    pub headers: Vec<(String, String)>,
    pub user_agent: String,
}

/// Proof of what Transport actually did, stored alongside any data it
/// returned so the claim "we only dialed the pinned IP" is auditable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportEvidence {
    pub connected_ip: IpAddr,
    pub connected_port: u16,
    pub certificate_pins_verified: Option<bool>,
    pub bytes_received: usize,
    pub truncated: bool,
    pub status_code: Option<u16>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectHop {
    pub from_url: String,
    pub to_url: String,
    pub status_code: u16,
}
