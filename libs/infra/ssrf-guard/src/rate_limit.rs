// [libs/infra/ssrf-guard/src/rate_limit.rs]
//! Minimal seam the Guard consults for its step-1 rate-limit check (spec
//! S4.4). Kept local to this crate (rather than depending on
//! `novaos-rate-limit` directly) so the Guard has no domain-crate
//! dependency; the app layer wires the real token-bucket limiter in.

use async_trait::async_trait;

#[async_trait]
pub trait RateLimitGate: Send + Sync {
    /// Returns `true` if the composite key (`userId ∥ ip`) is still within
    /// budget and the call may proceed.
    async fn check_and_consume(&self, composite_key: &str) -> bool;
}

/// Always-allow gate, used when no limiter is configured (tests, or a
/// deployment that rate-limits exclusively at the HTTP edge).
pub struct NoopRateLimitGate;

#[async_trait]
impl RateLimitGate for NoopRateLimitGate {
    async fn check_and_consume(&self, _composite_key: &str) -> bool {
        true
    }
}
