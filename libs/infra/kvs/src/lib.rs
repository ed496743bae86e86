// [libs/infra/kvs/src/lib.rs]
/*!
 * =================================================================
 * APARATO: KEY-VALUE STORE CONTRACT (V1.0 - GATE PIPELINE GOLD)
 * CLASIFICACIÓN: INFRASTRUCTURE (ESTRATO L3)
 * RESPONSABILIDAD: CONTRATO SEMANTICO SOBRE UN BACKEND SUSTITUIBLE
 *
 * VISION HIPER-HOLÍSTICA:
 * El resto del sistema (sword, scheduler-runtime, token-forge, rate-limit)
 * depende solo del trait `KeyValueStore`, nunca de un backend concreto.
 * `MemoryStore` es la implementacion de referencia; un backend Redis/Turso
 * real implementaria el mismo trait sin que un solo llamador cambie.
 * =================================================================
 */

mod memory;
mod pattern;
mod store;

pub use memory::MemoryStore;
pub use store::KeyValueStore;
