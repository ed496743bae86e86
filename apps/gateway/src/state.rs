// [apps/gateway/src/state.rs]
/*!
 * =================================================================
 * APARATO: GATEWAY STATE (V1.0 - GATE PIPELINE GOLD)
 * CLASIFICACIÓN: APPLICATION STATE (ESTRATO L1-APP)
 * RESPONSABILIDAD: CONTENEDOR COMPARTIDO DE CONFIGURACION, KVS Y PIPELINE
 *
 * VISION HIPER-HOLÍSTICA:
 * A diferencia del orquestador original, este estado no posee repositorios
 * de dominio propios: todo lo que el Gate Pipeline necesita ya vive detras
 * de `GatePipeline`. Lo unico que `AppState` agrega encima es el modo de
 * salud del proceso, para que un guardia perimetral (fuera de alcance aqui)
 * pueda decidir si acepta trafico nuevo.
 * =================================================================
 */

use std::sync::{Arc, RwLock};

use novaos_audit_trail::AuditAssembler;
use novaos_gate_strategy::GatePipeline;
use novaos_kvs::KeyValueStore;
use novaos_secrets_vault::ConfigHandle;
use tracing::{error, info, instrument, warn};

/// Modos de salud del proceso, leidos por cualquier guardia perimetral que
/// decida si un request nuevo debe ser aceptado.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemMode {
    Operational,
    Maintenance(String),
}

/// Contenedor de estado compartido del Gateway. Inmutable tras el arranque
/// salvo por `current_system_mode`, cuyo unico escritor es `Bootstrap`.
#[derive(Clone)]
pub struct AppState {
    pub config: ConfigHandle,
    pub kvs: Arc<dyn KeyValueStore>,
    pub pipeline: Arc<GatePipeline>,
    /// Owned here rather than inside `GatePipeline` itself: assembling a
    /// `ResponseAudit` is a post-pipeline concern at the wire boundary
    /// (`message.rs`), not a gate in `GATE_ORDER`.
    pub audit_assembler: Arc<AuditAssembler>,
    current_system_mode: Arc<RwLock<SystemMode>>,
}

impl AppState {
    pub fn new(config: ConfigHandle, kvs: Arc<dyn KeyValueStore>, pipeline: Arc<GatePipeline>, audit_assembler: Arc<AuditAssembler>) -> Self {
        Self { config, kvs, pipeline, audit_assembler, current_system_mode: Arc::new(RwLock::new(SystemMode::Operational)) }
    }

    #[instrument(skip(self))]
    pub fn set_mode(&self, target_system_mode: SystemMode) {
        match self.current_system_mode.write() {
            Ok(mut mode_guard) => {
                info!("🔄 [STATE_SHIFT]: Gateway transitioning to mode: {:?}", target_system_mode);
                *mode_guard = target_system_mode;
            }
            Err(lock_poison_fault) => {
                error!("💀 [STATE_LOCK_POISONED]: {}", lock_poison_fault);
            }
        }
    }

    /// Evalua si el Gateway puede aceptar trafico nuevo. Los handlers HTTP
    /// (fuera de alcance aqui) son quienes consultan esto antes de invocar
    /// al pipeline.
    #[instrument(skip(self), level = "debug")]
    pub fn is_operational(&self) -> Result<(), String> {
        let mode_guard = self.current_system_mode.read().map_err(|e| format!("LOCK_POISON_FAULT: {e}"))?;
        match &*mode_guard {
            SystemMode::Operational => Ok(()),
            SystemMode::Maintenance(reason) => {
                warn!("⛔ [ACCESS_DENIED]: Gateway under maintenance: {}", reason);
                Err(reason.clone())
            }
        }
    }
}
