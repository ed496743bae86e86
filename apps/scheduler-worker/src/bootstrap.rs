// [apps/scheduler-worker/src/bootstrap.rs]
/*!
 * =================================================================
 * APARATO: COMPOSITION ROOT (V1.0 - SPARK SCHEDULER GOLD)
 * CLASIFICACIÓN: APPLICATION WIRING (ESTRATO L1-APP)
 * RESPONSABILIDAD: ENSAMBLAJE DE LOS SEIS JOBS DEL SPARK SCHEDULER
 *
 * VISION HIPER-HOLÍSTICA:
 * Unico lugar que conoce `MemoryStore`, `SwordStore` y los seis
 * `JobHandler` concretos. `kernel.rs` rio abajo solo conoce
 * `JobRegistry`/`SchedulerRunner`.
 * =================================================================
 */

use std::sync::Arc;

use novaos_kvs::{KeyValueStore, MemoryStore};
use novaos_models::{JobId, JobSpec, RetryPolicy, Schedule};
use novaos_reminders::{ReminderEscalationJob, SparkEscalationStore};
use novaos_scheduler_runtime::{JobHandler, JobRegistry};
use novaos_secrets_vault::ConfigHandle;
use novaos_sword::SwordStore;

use crate::handlers::{
    DayEndReconciliationHandler, GenerateDailyStepsHandler, KnownSourcesHealthHandler, MorningSparksHandler, ReminderEscalationHandler,
    RetentionEnforcementHandler,
};
use crate::state::WorkerState;

const MINUTE_MS: u64 = 60_000;
const HOUR_MS: u64 = 60 * MINUTE_MS;
const DAY_MS: u64 = 24 * HOUR_MS;

/// The retry shape every job shares: three attempts, exponential backoff
/// starting at 30s, capped at 10 minutes. None of these six jobs has a
/// latency budget tight enough to need its own policy.
fn default_retry_policy() -> RetryPolicy {
    RetryPolicy { max_attempts: 3, base_backoff_ms: 30_000, max_backoff_ms: 600_000 }
}

pub async fn bootstrap() -> anyhow::Result<WorkerState> {
    let config_handle = ConfigHandle::load()?;

    let kvs: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let store = Arc::new(SwordStore::new(kvs.clone()));
    let escalation_store: Arc<dyn SparkEscalationStore> = store.clone();
    let reminder_job = ReminderEscalationJob::new(escalation_store, kvs.clone());

    let handlers: Vec<(JobSpec, Arc<dyn JobHandler>)> = vec![
        (
            JobSpec {
                id: JobId::GenerateDailySteps,
                // 02:00 UTC: well clear of `day_end_reconciliation`'s
                // midnight run, so tomorrow's steps never race today's close-out.
                schedule: Schedule::Cron { expression: "0 2 * * *".to_string() },
                lease_duration_ms: 5 * MINUTE_MS,
                retry_policy: default_retry_policy(),
            },
            Arc::new(GenerateDailyStepsHandler::new(store.clone())),
        ),
        (
            JobSpec {
                id: JobId::MorningSparks,
                schedule: Schedule::Cron { expression: "0 6 * * *".to_string() },
                lease_duration_ms: 5 * MINUTE_MS,
                retry_policy: default_retry_policy(),
            },
            Arc::new(MorningSparksHandler::new(store.clone())),
        ),
        (
            JobSpec {
                id: JobId::ReminderEscalation,
                schedule: Schedule::Interval { every_ms: 3 * HOUR_MS },
                lease_duration_ms: 5 * MINUTE_MS,
                retry_policy: default_retry_policy(),
            },
            Arc::new(ReminderEscalationHandler::new(reminder_job)),
        ),
        (
            JobSpec {
                id: JobId::DayEndReconciliation,
                schedule: Schedule::Cron { expression: "0 0 * * *".to_string() },
                lease_duration_ms: 10 * MINUTE_MS,
                retry_policy: default_retry_policy(),
            },
            Arc::new(DayEndReconciliationHandler::new(store.clone(), kvs.clone())),
        ),
        (
            JobSpec {
                id: JobId::KnownSourcesHealth,
                // `next_due_after` only understands daily-fixed-time or
                // step-interval cron; a weekly cadence has to be an interval.
                schedule: Schedule::Interval { every_ms: 7 * DAY_MS },
                lease_duration_ms: 5 * MINUTE_MS,
                retry_policy: default_retry_policy(),
            },
            Arc::new(KnownSourcesHealthHandler::new(kvs.clone())),
        ),
        (
            JobSpec {
                id: JobId::RetentionEnforcement,
                schedule: Schedule::Cron { expression: "30 3 * * *".to_string() },
                lease_duration_ms: 15 * MINUTE_MS,
                retry_policy: default_retry_policy(),
            },
            Arc::new(RetentionEnforcementHandler::new(config_handle.clone(), kvs.clone())),
        ),
    ];

    let registry = handlers.into_iter().fold(JobRegistry::new(), |registry, (spec, handler)| registry.register(spec, handler));

    Ok(WorkerState::new(config_handle, kvs, Arc::new(registry)))
}
