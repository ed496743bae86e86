// [apps/scheduler-worker/src/kernel.rs]
/*!
 * =================================================================
 * APARATO: WORKER KERNEL (V1.0 - SPARK SCHEDULER GOLD)
 * CLASIFICACIÓN: COMPOSITION ROOT (ESTRATO L1-APP)
 * RESPONSABILIDAD: IGNICIÓN DE `WorkerState` Y CICLO DE VIDA DEL PROCESO
 *
 * VISION HIPER-HOLÍSTICA:
 * A diferencia del Gateway, este proceso no tiene un binding HTTP externo
 * que lo empuje: el propio kernel sostiene el loop de tick contra
 * `SchedulerRunner`. Una senal Ctrl-C marca el `AtomicBool` compartido;
 * el loop drena el tick en curso y termina en el siguiente despertar.
 * =================================================================
 */

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Utc;
use novaos_models::JobExecutionResult;
use novaos_scheduler_runtime::SchedulerRunner;
use tracing::{error, info, instrument, warn};

use crate::bootstrap::bootstrap;
use crate::state::WorkerState;

/// How often the kernel checks whether any job is due. Jobs themselves
/// set their own cadence via `Schedule`; this is just the wakeup grain.
const TICK_INTERVAL: StdDuration = StdDuration::from_secs(30);

pub struct WorkerKernel {
    pub application_state: WorkerState,
    runner: SchedulerRunner,
    shutdown: Arc<AtomicBool>,
}

impl WorkerKernel {
    #[instrument]
    pub async fn ignite() -> anyhow::Result<Self> {
        let application_state = bootstrap().await?;
        let worker_id = std::env::var("NOVA_WORKER_ID").unwrap_or_else(|_| format!("scheduler-worker-{}", uuid::Uuid::new_v4()));
        let runner = SchedulerRunner::new(application_state.kvs.clone(), worker_id);
        info!("🚀 [WORKER_ONLINE]: Spark Scheduler registry wired and operational.");
        Ok(Self { application_state, runner, shutdown: Arc::new(AtomicBool::new(false)) })
    }

    /// Drives the tick loop until a shutdown signal lands. A `tokio::spawn`
    /// listens for Ctrl-C and flips the shared flag; the loop itself only
    /// ever reads it, so an in-flight tick always finishes its jobs before
    /// the process exits.
    pub async fn run_until_shutdown(self) {
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("🛑 [SHUTDOWN_SIGNAL]: Ctrl-C received, finishing in-flight tick."),
                Err(signal_error) => error!("💀 [SIGNAL_HANDLER_FAULT]: Failed to listen for shutdown signal: {}", signal_error),
            }
            shutdown.store(true, Ordering::SeqCst);
        });

        let mut ticker = tokio::time::interval(TICK_INTERVAL);
        while !self.shutdown.load(Ordering::SeqCst) {
            ticker.tick().await;
            if self.shutdown.load(Ordering::SeqCst) {
                break;
            }
            self.run_tick().await;
        }

        info!("🔻 [WORKER_OFFLINE]: Tick loop drained, exiting.");
    }

    #[instrument(skip(self))]
    async fn run_tick(&self) {
        let now = Utc::now();
        let executions = self.runner.tick(&self.application_state.registry, now).await;
        for execution in &executions {
            match execution.result {
                Some(JobExecutionResult::Success) => info!(job = %execution.job_id.as_str(), "job tick succeeded"),
                Some(JobExecutionResult::Failed) => warn!(job = %execution.job_id.as_str(), "job tick failed, will retry on backoff"),
                Some(JobExecutionResult::LeaseConflict) => info!(job = %execution.job_id.as_str(), "job tick skipped, lease held elsewhere"),
                None => warn!(job = %execution.job_id.as_str(), "job tick produced no result"),
            }
        }
    }
}
