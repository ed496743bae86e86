// [libs/domain/audit-trail/src/lib.rs]
/*!
 * =================================================================
 * APARATO: AUDIT TRAIL (V1.0 - GATE PIPELINE GOLD)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: RECONSTRUCCIÓN TAMPER-EVIDENT DE CADA RESPUESTA EMITIDA
 *
 * VISION HIPER-HOLÍSTICA:
 * Todo lo que el pipeline hizo con un mensaje debe ser reconstruible sin
 * jamás exponer el texto crudo: el hash de entrada/salida certifica
 * integridad, la redacción de PII certifica que solo los *nombres* de
 * patrón sobreviven (nunca la coincidencia), y el sobre cifrado certifica
 * que incluso el snapshot redactado requiere la llave de auditoría
 * vigente para ser leído.
 * =================================================================
 */

pub mod assembler;
pub mod redaction;
pub mod snapshot;

pub use assembler::AuditAssembler;
pub use redaction::{redact, PiiRedactionResult, PII_PATTERN_VERSION};
pub use snapshot::{AuditSnapshot, SnapshotStore};
