// [libs/core/token-forge/src/nonce_store.rs]
//! Single-use nonce reservation, backed by whatever KVS the deployment uses.
//! `libs/infra/kvs` ships the concrete adapter (`ack:nonce:{nonce}`, spec S6);
//! this crate only depends on the trait so core stays infra-agnostic.

use async_trait::async_trait;

#[async_trait]
pub trait NonceStore: Send + Sync {
    /// Atomically reserves `nonce` for `ttl_ms` milliseconds. Returns `true`
    /// if the nonce was unseen and is now reserved, `false` if it was
    /// already present (replay).
    async fn reserve(&self, nonce: &str, ttl_ms: u64) -> bool;
}

/// In-memory nonce store for tests. Not TTL-accurate (never expires) —
/// sufficient for single-test-run replay checks.
#[derive(Default)]
pub struct InMemoryNonceStore {
    seen: std::sync::Mutex<std::collections::HashSet<String>>,
}

#[async_trait]
impl NonceStore for InMemoryNonceStore {
    async fn reserve(&self, nonce: &str, _ttl_ms: u64) -> bool {
        let mut seen = self.seen.lock().expect("nonce store mutex poisoned");
        seen.insert(nonce.to_string())
    }
}
