// [libs/infra/ssrf-guard/src/hostname.rs]
//! Hostname normalization and alternate-IP-encoding detection (spec S4.4
//! step 3). A naive blocklist that string-matches `127.0.0.1` is trivially
//! bypassed by `2130706433` or `0x7f.1`; both forms still resolve to the
//! same address, so they are rejected outright rather than normalized.

use std::net::IpAddr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HostnameError {
    #[error("hostname could not be converted to ASCII (IDNA failure)")]
    IdnaFailure,
    #[error("hostname uses an alternate IP encoding: {0}")]
    AlternateIpEncoding(&'static str),
}

/// Converts a (possibly Unicode/IDN) hostname to its ASCII form and rejects
/// any alternate numeric-IP encoding. Plain dotted-decimal or bracketed
/// IPv6 literals pass through unchanged — those are resolved normally and
/// classified by [`crate::classify_ip`] like any other address.
pub fn normalize_hostname(raw: &str) -> Result<String, HostnameError> {
    if raw.parse::<IpAddr>().is_ok() {
        return Ok(raw.to_string());
    }

    let ascii = idna::domain_to_ascii(raw).map_err(|_| HostnameError::IdnaFailure)?;

    if let Some(reason) = detect_alternate_ip_encoding(&ascii) {
        return Err(HostnameError::AlternateIpEncoding(reason));
    }

    Ok(ascii)
}

fn detect_alternate_ip_encoding(hostname: &str) -> Option<&'static str> {
    if is_raw_integer_ip(hostname) {
        return Some("raw_integer");
    }
    if is_dotted_hex_ip(hostname) {
        return Some("dotted_hex");
    }
    if is_dotted_octal_ip(hostname) {
        return Some("dotted_octal");
    }
    None
}

/// e.g. `2130706433` (decimal form of 127.0.0.1).
fn is_raw_integer_ip(hostname: &str) -> bool {
    !hostname.is_empty() && hostname.chars().all(|c| c.is_ascii_digit()) && hostname.parse::<u64>().is_ok()
}

/// e.g. `0x7f.0x0.0x0.0x1` or a single `0x7f000001`.
fn is_dotted_hex_ip(hostname: &str) -> bool {
    let segments: Vec<&str> = hostname.split('.').collect();
    segments.iter().any(|segment| {
        let lower = segment.to_ascii_lowercase();
        lower.starts_with("0x") && lower.len() > 2 && lower[2..].chars().all(|c| c.is_ascii_hexdigit())
    })
}

/// e.g. `0177.0.0.1` (octal form of a loopback octet).
fn is_dotted_octal_ip(hostname: &str) -> bool {
    let segments: Vec<&str> = hostname.split('.').collect();
    if segments.len() != 4 {
        return false;
    }
    segments.iter().any(|segment| {
        segment.len() > 1 && segment.starts_with('0') && segment.chars().all(|c| c.is_ascii_digit())
    })
}
