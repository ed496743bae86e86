// [libs/domain/models/src/lib.rs]
/*!
 * =================================================================
 * APARATO: NOVAOS DOMAIN MODELS (V1.0 - GATE PIPELINE GOLD)
 * CLASIFICACIÓN: DOMAIN ENTITIES (ESTRATO L2)
 * RESPONSABILIDAD: FUENTE UNICA DE VERDAD PARA TIPOS COMPARTIDOS
 *
 * VISION HIPER-HOLÍSTICA:
 * Toda mutacion de PipelineState es clone-then-replace: ningun gate
 * recibe &mut, cada uno produce un nuevo estado a partir de una
 * referencia inmutable al anterior. Esto es lo que hace segura la
 * re-ejecucion parcial del loop de regeneracion (Model + Constitutional).
 * =================================================================
 */

pub mod audit;
pub mod errors;
pub mod evidence;
pub mod pipeline;
pub mod risk;
pub mod scheduler;
pub mod source_health;
pub mod ssrf;
pub mod sword;
pub mod wire;

pub use audit::{PolicyVersions, ResponseAudit};
pub use errors::{ApiError, ApiErrorCode};
pub use evidence::{CapabilityName, ConstraintLevel, ContextItem, EvidencePack, NumericToken, ProviderResult};
pub use pipeline::{GateAction, GateId, GateResult, GateStatus, PipelineState, RequestContext, Stance};
pub use risk::{InterventionLevel, RiskSummary, VetoType};
pub use scheduler::{JobExecution, JobExecutionResult, JobId, JobSpec, RetryPolicy, Schedule};
pub use source_health::{SourceHealth, SourceStatus};
pub use ssrf::{RedirectHop, SsrfCheck, SsrfDecision, TransportEvidence, TransportRequirements};
pub use sword::{Goal, GoalStatus, Quest, QuestStatus, SideEffect, Spark, SparkStatus, Step, StepStatus};
pub use wire::{AckRequired, ResponseEnvelope, ResponseStatus, StreamEvent};
