// [libs/domain/gate-strategy/src/lib.rs]
/*!
 * =================================================================
 * APARATO: GATE STRATEGY ORCHESTRATOR (V1.0 - GATE PIPELINE GOLD)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: DESPACHO POLIMÓRFICO SOBRE LA SECUENCIA FIJA DE GATES
 *
 * VISION HIPER-HOLÍSTICA:
 * Cada gate implementa el mismo contrato (`GateHandler`); este aparato no
 * conoce el detalle interno de ninguno. Despacha en el orden canónico
 * `GATE_ORDER`, aplica el presupuesto de tiempo por gate, y resuelve las
 * tres desviaciones de flujo que un gate puede pedir: redirect (Stance),
 * regenerate (Constitutional → Model) y el corte definitivo (stop /
 * await_ack). El resultado es un `PipelineOutcome` inmutable, sellado una
 * sola vez por request.
 * =================================================================
 */

pub mod handler;
pub mod outcome;
pub mod orchestrator;

pub use handler::GateHandler;
pub use outcome::PipelineOutcome;
pub use orchestrator::GatePipeline;
