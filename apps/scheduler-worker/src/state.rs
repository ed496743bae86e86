// [apps/scheduler-worker/src/state.rs]
/*!
 * =================================================================
 * APARATO: WORKER STATE (V1.0 - SPARK SCHEDULER GOLD)
 * CLASIFICACIÓN: APPLICATION STATE (ESTRATO L1-APP)
 * RESPONSABILIDAD: CONTENEDOR COMPARTIDO DE CONFIGURACION, KVS Y REGISTRY
 * =================================================================
 */

use std::sync::Arc;

use novaos_kvs::KeyValueStore;
use novaos_scheduler_runtime::JobRegistry;
use novaos_secrets_vault::ConfigHandle;

#[derive(Clone)]
pub struct WorkerState {
    pub config: ConfigHandle,
    pub kvs: Arc<dyn KeyValueStore>,
    pub registry: Arc<JobRegistry>,
}

impl WorkerState {
    pub fn new(config: ConfigHandle, kvs: Arc<dyn KeyValueStore>, registry: Arc<JobRegistry>) -> Self {
        Self { config, kvs, registry }
    }
}
