// [libs/infra/scheduler-runtime/src/lib.rs]
/*!
 * =================================================================
 * APARATO: SCHEDULER RUNTIME (V1.0 - GATE PIPELINE GOLD)
 * CLASIFICACIÓN: INFRASTRUCTURE (ESTRATO L3)
 * RESPONSABILIDAD: TICK / LEASE / EJECUCION / BACKOFF DEL SPARK SCHEDULER
 *
 * VISION HIPER-HOLÍSTICA:
 * Este crate no sabe nada de goles, quests, pasos o sparks — eso vive en
 * los `JobHandler` que `scheduler-worker` registra. Lo unico que posee es
 * el mecanismo: cuando un job esta due, quien gana el lease sobre ese tick,
 * y que pasa cuando el handler falla. La idempotencia de cada handler
 * sobre su propio `(jobId, tick)` es lo que hace seguro reintentar.
 * =================================================================
 */

mod errors;
mod handler;
mod lease;
mod registry;
mod runner;
mod schedule;

pub use errors::SchedulerError;
pub use handler::{JobHandler, JobRunContext};
pub use lease::JobLease;
pub use registry::{JobRegistration, JobRegistry};
pub use runner::SchedulerRunner;
pub use schedule::next_due_after;
