// [apps/scheduler-worker/src/main.rs]
/*!
 * =================================================================
 * APARATO: SCHEDULER WORKER MAIN ENTRY POINT (V1.0 - SPARK SCHEDULER GOLD)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L3)
 * RESPONSABILIDAD: IGNICIÓN DEL PROCESO Y ESPERA DE SEÑAL DE APAGADO
 * =================================================================
 */

use novaos_scheduler_worker::prelude::*;
use novaos_telemetry::init_tracing;

use dotenvy::dotenv;
use tracing::{error, info};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    init_tracing("novaos-scheduler-worker");

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().thread_stack_size(4 * 1024 * 1024).build()?;

    runtime.block_on(async {
        info!("🛰️  [WORKER_BOOT]: Ignition sequence starting...");

        let kernel = match WorkerKernel::ignite().await {
            Ok(kernel) => kernel,
            Err(ignition_error) => {
                error!("💀 [IGNITION_FAILED]: Scheduler worker could not reach an operational state: {}", ignition_error);
                std::process::exit(1);
            }
        };

        kernel.run_until_shutdown().await;

        Ok(())
    })
}
