// [libs/infra/scheduler-runtime/src/runner.rs]
//! The five-step execution loop (spec S4.10): tick, lease, run, and the
//! success/failure bookkeeping that makes retries and re-scheduling land on
//! the same `next_due` index every worker reads.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use novaos_kvs::KeyValueStore;
use novaos_models::{JobExecution, JobExecutionResult, JobId, JobSpec};
use uuid::Uuid;

use crate::errors::SchedulerError;
use crate::handler::JobRunContext;
use crate::lease::JobLease;
use crate::registry::JobRegistry;
use crate::schedule::next_due_after;

fn next_due_index_key(job_id: JobId) -> String {
    format!("scheduler:next_due:{}", job_id.as_str())
}

fn attempt_key(job_id: JobId, tick: &str) -> String {
    format!("scheduler:attempts:{}:{}", job_id.as_str(), tick)
}

/// How long an attempt counter survives in the KVS. Generous relative to
/// any job's backoff ceiling so a slow retry sequence never loses count of
/// itself mid-flight.
const ATTEMPT_COUNTER_TTL: Duration = Duration::from_secs(7 * 24 * 3600);

pub struct SchedulerRunner {
    kvs: Arc<dyn KeyValueStore>,
    worker_id: String,
}

impl SchedulerRunner {
    pub fn new(kvs: Arc<dyn KeyValueStore>, worker_id: impl Into<String>) -> Self {
        Self { kvs, worker_id: worker_id.into() }
    }

    async fn read_next_due(&self, job_id: JobId, now: DateTime<Utc>) -> DateTime<Utc> {
        match self.kvs.get(&next_due_index_key(job_id)).await {
            Some(bytes) => serde_json::from_slice(&bytes).unwrap_or(now),
            // A job never seen before is due immediately rather than
            // waiting a full period for its first run.
            None => now,
        }
    }

    async fn write_next_due(&self, job_id: JobId, due: DateTime<Utc>) {
        let bytes = serde_json::to_vec(&due).expect("DateTime<Utc> always serializes");
        self.kvs.set_with_ttl(&next_due_index_key(job_id), bytes, None).await;
    }

    async fn read_attempt(&self, job_id: JobId, tick: &str) -> u32 {
        match self.kvs.get(&attempt_key(job_id, tick)).await {
            Some(bytes) => serde_json::from_slice(&bytes).unwrap_or(0),
            None => 0,
        }
    }

    async fn write_attempt(&self, job_id: JobId, tick: &str, attempt: u32) {
        let bytes = serde_json::to_vec(&attempt).expect("u32 always serializes");
        self.kvs.set_with_ttl(&attempt_key(job_id, tick), bytes, Some(ATTEMPT_COUNTER_TTL)).await;
    }

    async fn clear_attempt(&self, job_id: JobId, tick: &str) {
        self.kvs.delete(&attempt_key(job_id, tick)).await;
    }

    /// Runs one sweep of the registry: every job whose `next_due` has
    /// arrived gets a lease attempt and, if won, a handler invocation.
    /// Jobs not yet due, or whose lease is held by another worker this
    /// tick, are simply absent from the returned executions.
    pub async fn tick(&self, registry: &JobRegistry, now: DateTime<Utc>) -> Vec<JobExecution> {
        let mut executions = Vec::new();
        for registration in registry.jobs() {
            let spec = &registration.spec;
            let due_at = self.read_next_due(spec.id, now).await;
            if due_at > now {
                continue;
            }

            let tick = due_at.to_rfc3339();
            if let Some(execution) = self.run_due_job(spec, registration.handler.as_ref(), &tick, due_at, now).await {
                executions.push(execution);
            }
        }
        executions
    }

    async fn run_due_job(
        &self,
        spec: &JobSpec,
        handler: &dyn crate::handler::JobHandler,
        tick: &str,
        scheduled_for: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Option<JobExecution> {
        let lease_duration = Duration::from_millis(spec.lease_duration_ms);
        let lease = match JobLease::acquire(self.kvs.clone(), spec.id, tick, &self.worker_id, lease_duration).await {
            Some(lease) => lease,
            None => {
                return Some(JobExecution {
                    execution_id: Uuid::new_v4().to_string(),
                    job_id: spec.id,
                    tick: tick.to_string(),
                    started_at: now,
                    lease_expires_at: now,
                    attempt: self.read_attempt(spec.id, tick).await,
                    result: Some(JobExecutionResult::LeaseConflict),
                });
            }
        };

        let attempt = self.read_attempt(spec.id, tick).await + 1;
        let ctx = JobRunContext { job_id: spec.id, tick: tick.to_string(), scheduled_for, attempt };
        let lease_expires_at = now + chrono::Duration::milliseconds(spec.lease_duration_ms as i64);

        let outcome = self.run_with_lease_renewal(&lease, lease_duration, spec.id, handler, &ctx).await;
        lease.release().await;

        let result = match outcome {
            Ok(()) => {
                self.clear_attempt(spec.id, tick).await;
                let next = next_due_after(&spec.schedule, scheduled_for).unwrap_or(scheduled_for);
                self.write_next_due(spec.id, next).await;
                tracing::info!(job_id = spec.id.as_str(), %tick, "job succeeded");
                JobExecutionResult::Success
            }
            Err(error) => {
                tracing::warn!(job_id = spec.id.as_str(), %tick, attempt, %error, "job attempt failed");
                if attempt >= spec.retry_policy.max_attempts {
                    self.clear_attempt(spec.id, tick).await;
                    let next = next_due_after(&spec.schedule, scheduled_for).unwrap_or(scheduled_for);
                    self.write_next_due(spec.id, next).await;
                    tracing::error!(job_id = spec.id.as_str(), %tick, "job exhausted retries, giving up on this tick");
                    JobExecutionResult::Failed
                } else {
                    self.write_attempt(spec.id, tick, attempt).await;
                    let backoff = spec.retry_policy.backoff_for_attempt(attempt);
                    let retry_at = now + chrono::Duration::milliseconds(backoff as i64);
                    self.write_next_due(spec.id, retry_at).await;
                    JobExecutionResult::Failed
                }
            }
        };

        Some(JobExecution { execution_id: Uuid::new_v4().to_string(), job_id: spec.id, tick: tick.to_string(), started_at: now, lease_expires_at, attempt, result: Some(result) })
    }

    /// Bounds the handler by `lease_duration` while keeping the KVS lease
    /// alive underneath it: a renewal tick fires at half the lease period
    /// so a handler that legitimately takes most of the window never loses
    /// its lease to another worker mid-run.
    async fn run_with_lease_renewal(
        &self,
        lease: &JobLease,
        lease_duration: Duration,
        job_id: JobId,
        handler: &dyn crate::handler::JobHandler,
        ctx: &JobRunContext,
    ) -> Result<(), SchedulerError> {
        let renew_every = (lease_duration / 2).max(Duration::from_millis(1));

        let renewal_loop = async {
            let mut ticker = tokio::time::interval(renew_every);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                lease.renew(lease_duration).await;
            }
        };

        tokio::select! {
            outcome = tokio::time::timeout(lease_duration, handler.run(ctx)) => match outcome {
                Ok(Ok(())) => Ok(()),
                Ok(Err(message)) => Err(SchedulerError::HandlerFailed(job_id, message)),
                Err(_) => Err(SchedulerError::HandlerTimedOut(job_id)),
            },
            _ = renewal_loop => unreachable!("the renewal loop never completes on its own"),
        }
    }
}
