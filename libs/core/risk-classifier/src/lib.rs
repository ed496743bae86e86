// [libs/core/risk-classifier/src/lib.rs]
/*!
 * =================================================================
 * APARATO: RISK CLASSIFIER (V1.0 - GATE PIPELINE GOLD)
 * CLASIFICACIÓN: CORE SAFETY (ESTRATO L1)
 * RESPONSABILIDAD: PARSEO Y NORMALIZACIÓN DE LA CLASIFICACIÓN DE RIESGO
 *
 * VISION HIPER-HOLÍSTICA:
 * Shield invoca un clasificador LLM con rubrica fija y obtiene JSON en
 * bruto. Esta crate no llama al modelo; consume su salida, impone
 * consistencia categoria↔nivel y produce un RiskSummary soberano que el
 * orquestador de gates puede usar sin volver a interpretar texto libre.
 * =================================================================
 */

pub mod errors;
pub mod normalizer;
pub mod rubric;

pub use errors::ClassificationError;
pub use normalizer::{ConsistencyNormalizer, RawClassification, RiskCategory, RiskLevel};
pub use rubric::SHIELD_RUBRIC;
