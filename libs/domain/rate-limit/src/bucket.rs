// [libs/domain/rate-limit/src/bucket.rs]
//! Token-bucket check-and-consume (spec S4.8). The bucket's state lives
//! under one KVS key (`rl:{key}`) so a single `compare_and_swap` covers
//! the whole read-refill-consume-write cycle atomically; `rl:{key}:ts`
//! is written alongside as a denormalized mirror of the refill instant
//! for operators inspecting the store directly, never read back by this
//! type itself.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use novaos_kvs::KeyValueStore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::key::RateLimitKey;

/// Bucket parameters (spec S4.8): `maxTokens`, `refillRate` (tokens/sec),
/// `windowMs`. `window_ms` doubles as the KVS TTL for the bucket's state
/// — a bucket untouched for a full window has nothing left to track and
/// is allowed to expire back to a fresh, full bucket.
#[derive(Debug, Clone, Copy)]
pub struct TokenBucketConfig {
    pub max_tokens: u32,
    pub refill_rate_per_sec: f64,
    pub window_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct BucketState {
    tokens: f64,
    last_refill_ms: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub limit: u32,
    pub reset_ms: u64,
    pub retry_after_ms: Option<u64>,
}

#[derive(Debug, Error)]
pub enum RateLimitError {
    #[error("failed to (de)serialize bucket state: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("bucket consume did not converge after {0} compare-and-swap attempts")]
    ConsumeRetriesExhausted(u8),
}

const MAX_CAS_ATTEMPTS: u8 = 8;

pub struct TokenBucketLimiter {
    kvs: Arc<dyn KeyValueStore>,
}

impl TokenBucketLimiter {
    pub fn new(kvs: Arc<dyn KeyValueStore>) -> Self {
        Self { kvs }
    }

    /// Atomic check-and-consume. Retries the compare-and-swap against
    /// whatever value a racing caller just wrote, bounded by
    /// `MAX_CAS_ATTEMPTS` — under the contention this is meant to survive,
    /// convergence happens within a couple of retries; exhaustion means
    /// something is wrong with the store, not with the algorithm.
    pub async fn check_and_consume(&self, key: &RateLimitKey, config: &TokenBucketConfig) -> Result<RateLimitDecision, RateLimitError> {
        let storage_key = format!("rl:{}", key.composite());
        let timestamp_mirror_key = format!("rl:{}:ts", key.composite());
        let ttl = Duration::from_millis(config.window_ms);

        for _ in 0..MAX_CAS_ATTEMPTS {
            let now_ms = current_time_ms();
            let raw = self.kvs.get(&storage_key).await;
            let state = match &raw {
                Some(bytes) => serde_json::from_slice::<BucketState>(bytes)?,
                None => BucketState { tokens: config.max_tokens as f64, last_refill_ms: now_ms },
            };

            let elapsed_ms = (now_ms - state.last_refill_ms).max(0) as f64;
            let refilled = state.tokens + (elapsed_ms / 1000.0) * config.refill_rate_per_sec;
            let tokens_before_consume = refilled.min(config.max_tokens as f64);
            let allowed = tokens_before_consume >= 1.0;
            let tokens_after_consume = if allowed { tokens_before_consume - 1.0 } else { tokens_before_consume };

            let new_state = BucketState { tokens: tokens_after_consume, last_refill_ms: now_ms };
            let new_bytes = serde_json::to_vec(&new_state)?;

            match self.kvs.compare_and_swap(&storage_key, raw, new_bytes, Some(ttl)).await {
                Ok(()) => {
                    self.kvs.set_with_ttl(&timestamp_mirror_key, now_ms.to_be_bytes().to_vec(), Some(ttl)).await;
                    let reset_ms = seconds_to_ms((config.max_tokens as f64 - tokens_after_consume) / config.refill_rate_per_sec);
                    let retry_after_ms =
                        (!allowed).then(|| seconds_to_ms((1.0 - tokens_before_consume).max(0.0) / config.refill_rate_per_sec));
                    return Ok(RateLimitDecision {
                        allowed,
                        remaining: tokens_after_consume.floor().max(0.0) as u32,
                        limit: config.max_tokens,
                        reset_ms,
                        retry_after_ms,
                    });
                }
                Err(_) => continue,
            }
        }

        Err(RateLimitError::ConsumeRetriesExhausted(MAX_CAS_ATTEMPTS))
    }
}

fn current_time_ms() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as i64).unwrap_or(0)
}

fn seconds_to_ms(seconds: f64) -> u64 {
    (seconds.max(0.0) * 1000.0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use novaos_kvs::MemoryStore;

    fn limiter() -> TokenBucketLimiter {
        let kvs: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        TokenBucketLimiter::new(kvs)
    }

    fn config() -> TokenBucketConfig {
        TokenBucketConfig { max_tokens: 3, refill_rate_per_sec: 1.0, window_ms: 60_000 }
    }

    #[tokio::test]
    async fn allows_up_to_the_burst_then_denies() {
        let limiter = limiter();
        let key = RateLimitKey::user("u1");
        let config = config();

        for _ in 0..3 {
            let decision = limiter.check_and_consume(&key, &config).await.unwrap();
            assert!(decision.allowed);
        }
        let denied = limiter.check_and_consume(&key, &config).await.unwrap();
        assert!(!denied.allowed);
        assert!(denied.retry_after_ms.is_some());
    }

    #[tokio::test]
    async fn remaining_counts_down_with_each_consume() {
        let limiter = limiter();
        let key = RateLimitKey::user("u2");
        let config = config();

        let first = limiter.check_and_consume(&key, &config).await.unwrap();
        assert_eq!(first.remaining, 2);
        let second = limiter.check_and_consume(&key, &config).await.unwrap();
        assert_eq!(second.remaining, 1);
    }

    #[tokio::test]
    async fn distinct_keys_have_independent_buckets() {
        let limiter = limiter();
        let config = config();
        limiter.check_and_consume(&RateLimitKey::user("a"), &config).await.unwrap();
        limiter.check_and_consume(&RateLimitKey::user("a"), &config).await.unwrap();
        limiter.check_and_consume(&RateLimitKey::user("a"), &config).await.unwrap();
        let still_allowed = limiter.check_and_consume(&RateLimitKey::user("b"), &config).await.unwrap();
        assert!(still_allowed.allowed);
    }

    #[tokio::test]
    async fn refill_restores_tokens_after_elapsed_time() {
        let limiter = limiter();
        let key = RateLimitKey::user("u3");
        let fast_refill = TokenBucketConfig { max_tokens: 1, refill_rate_per_sec: 1000.0, window_ms: 60_000 };

        let first = limiter.check_and_consume(&key, &fast_refill).await.unwrap();
        assert!(first.allowed);
        let immediately_denied = limiter.check_and_consume(&key, &fast_refill).await.unwrap();
        assert!(!immediately_denied.allowed);

        tokio::time::sleep(Duration::from_millis(20)).await;
        let after_refill = limiter.check_and_consume(&key, &fast_refill).await.unwrap();
        assert!(after_refill.allowed);
    }

    #[tokio::test]
    async fn limit_reflects_the_configured_max_tokens() {
        let limiter = limiter();
        let decision = limiter.check_and_consume(&RateLimitKey::user("u4"), &config()).await.unwrap();
        assert_eq!(decision.limit, 3);
    }
}
