// [libs/domain/sword/src/lib.rs]
/*!
 * =================================================================
 * APARATO: SWORD STATE MACHINES (V1.0 - GATE PIPELINE GOLD)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: GOAL/QUEST/STEP/SPARK — TRANSICIONES Y CASCADA
 *
 * VISION HIPER-HOLÍSTICA:
 * Cada transición es pura: `(entity, event) -> (entity', sideEffects[])`.
 * El aparato que sí toca el KVS (`store`) nunca decide una transición por
 * su cuenta — aplica la que `transitions` calculó y drena los efectos
 * secundarios hasta que la cola queda vacía.
 * =================================================================
 */

pub mod progress;
pub mod store;
pub mod transitions;

pub use progress::{maybe_cascade_complete, recompute_goal_progress, recompute_quest_progress};
pub use store::{StoreError, SwordStore};
pub use transitions::{apply_goal_event, apply_quest_event, apply_spark_event, apply_step_event, GoalEvent, QuestEvent, SparkEvent, StepEvent, TransitionError};
