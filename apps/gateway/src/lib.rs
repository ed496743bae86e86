// [apps/gateway/src/lib.rs]
/*!
 * =================================================================
 * APARATO: GATEWAY LIBRARY ROOT (V1.0 - GATE PIPELINE GOLD)
 * CLASIFICACIÓN: CRATE ROOT (ESTRATO L3)
 * RESPONSABILIDAD: DEFINICIÓN DEL ÁRBOL DE MÓDULOS DEL GATEWAY
 *
 * Ocho gates, un orquestador (`novaos-gate-strategy`, fuera de este
 * crate), un estado compartido y un unico punto de entrada de mensajes.
 * Nada mas vive aqui.
 * =================================================================
 */

/// Ensamblaje de todo aparato core/dominio/infra concreto en un `AppState`.
pub mod bootstrap;
/// Una implementacion de `GateHandler` por gate (spec GATE_ORDER).
pub mod gates;
/// Ignicion y ciclo de vida del proceso.
pub mod kernel;
/// Traduce una submission en un `ResponseEnvelope`, corriendo el rate
/// limit de borde, el Gate Pipeline y el sellado de auditoria.
pub mod message;
/// Contenedor de estado compartido: configuracion, KVS, pipeline, modo.
pub mod state;

pub mod prelude {
    pub use crate::kernel::GatewayKernel;
    pub use crate::message::{process, Submission};
    pub use crate::state::{AppState, SystemMode};
}
