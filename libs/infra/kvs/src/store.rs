// [libs/infra/kvs/src/store.rs]
//! The semantic contract every backend must satisfy (spec S4.0 / S2 #1).

use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Option<Vec<u8>>;

    async fn set_with_ttl(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>);

    /// Atomic set-if-absent: the foundation for scheduler leases
    /// (`scheduler:lease:{jobId}:{tick}`) and nonce reservation
    /// (`ack:nonce:{nonce}`). Returns `true` iff this call won the race.
    async fn set_if_absent(&self, key: &str, value: Vec<u8>, ttl: Duration) -> bool;

    async fn delete(&self, key: &str) -> bool;

    /// Atomically adds `delta` to the integer stored at `key` (0 if absent)
    /// and returns the new value.
    async fn incr_by(&self, key: &str, delta: i64) -> i64;

    /// Atomic compare-and-swap: if the bytes currently stored at `key`
    /// equal `expected` (`None` meaning the key is absent or expired),
    /// replaces them with `new` and applies `ttl`. On mismatch, returns
    /// the value actually stored so the caller can retry without a
    /// second round trip. Backs the rate limiter's token bucket consume
    /// (the one read-modify-write in this trait that genuinely needs a
    /// guard, alongside `set_if_absent` for leases).
    async fn compare_and_swap(&self, key: &str, expected: Option<Vec<u8>>, new: Vec<u8>, ttl: Option<Duration>) -> Result<(), Option<Vec<u8>>>;

    async fn set_add(&self, key: &str, member: &str) -> bool;
    async fn set_remove(&self, key: &str, member: &str) -> bool;
    async fn set_members(&self, key: &str) -> Vec<String>;
    async fn set_cardinality(&self, key: &str) -> usize;

    async fn zadd(&self, key: &str, member: &str, score: f64);
    async fn zrem(&self, key: &str, member: &str) -> bool;
    async fn zrange_by_score(&self, key: &str, min: f64, max: f64) -> Vec<(String, f64)>;

    async fn lpush(&self, key: &str, value: Vec<u8>);
    async fn rpop(&self, key: &str) -> Option<Vec<u8>>;

    /// Glob-style (`*` wildcard) key enumeration. Backends without native
    /// pattern scan (e.g. Redis KEYS-less clusters) may implement this with
    /// a secondary index; callers must not assume O(1).
    async fn scan_by_pattern(&self, pattern: &str) -> Vec<String>;
}
