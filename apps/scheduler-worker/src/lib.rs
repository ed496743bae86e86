// [apps/scheduler-worker/src/lib.rs]
/*!
 * =================================================================
 * APARATO: SCHEDULER WORKER LIBRARY ROOT (V1.0 - SPARK SCHEDULER GOLD)
 * CLASIFICACIÓN: CRATE ROOT (ESTRATO L3)
 * RESPONSABILIDAD: DEFINICIÓN DEL ÁRBOL DE MÓDULOS DEL WORKER
 *
 * Seis `JobHandler`, un registry (`novaos-scheduler-runtime`, fuera de
 * este crate), un estado compartido y un kernel que sostiene su propio
 * loop de tick. Nada mas vive aqui.
 * =================================================================
 */

/// Ensamblaje de `SwordStore`, KVS y los seis `JobHandler` en un `WorkerState`.
pub mod bootstrap;
/// Una implementacion de `JobHandler` por job (spec S4.10).
pub mod handlers;
/// Ignicion y loop de tick del proceso.
pub mod kernel;
/// Contenedor de estado compartido: configuracion, KVS, registry.
pub mod state;

pub mod prelude {
    pub use crate::kernel::WorkerKernel;
    pub use crate::state::WorkerState;
}
