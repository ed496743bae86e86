// [libs/domain/cognition/src/lib.rs]
/*!
 * =================================================================
 * APARATO: COGNITION (V1.0 - GATE PIPELINE GOLD)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: CADENA DE PROVEEDORES LLM Y VALIDACIÓN CONSTITUCIONAL
 *
 * VISION HIPER-HOLÍSTICA:
 * Esta crate nunca decide si una respuesta es segura de enviar — solo
 * genera texto (Model) y lo juzga contra una rúbrica fija (Constitutional).
 * El orquestador de gates es quien decide qué hacer con el veredicto.
 * =================================================================
 */

pub mod constitutional;
pub mod errors;
pub mod prompt;
pub mod provider;

pub use constitutional::{ConstitutionalAction, ConstitutionalValidator, ConstitutionalVerdict, CONSTITUTIONAL_RUBRIC};
pub use errors::CognitionError;
pub use prompt::{apply_post_constraints, compose_prompt, GenerationConstraints};
pub use provider::{CompletionRequest, CompletionResponse, DeterministicStubProvider, LlmProvider, ProviderChain};
