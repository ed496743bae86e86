// [libs/domain/reminders/src/lib.rs]
/*!
 * =================================================================
 * APARATO: REMINDERS (V1.0 - GATE PIPELINE GOLD)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: ESCALACIÓN DE SPARKS ACTIVOS Y ENCOLADO AL USUARIO
 *
 * VISION HIPER-HOLÍSTICA:
 * `reminder_escalation` corre cada 3 horas sobre todos los sparks activos;
 * este aparato es solo el cómputo puro (edad -> nivel) y el efecto de
 * encolar — la mecánica de lease/retry/backoff del propio tick vive en
 * `scheduler-runtime`, nunca aquí.
 * =================================================================
 */

pub mod escalation;
pub mod notification;

pub use escalation::target_escalation_level;
pub use notification::{EscalationError, EscalationRunSummary, ReminderEscalationJob, ReminderNotification, SparkEscalationStore};
