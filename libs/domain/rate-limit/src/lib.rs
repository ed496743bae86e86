// [libs/domain/rate-limit/src/lib.rs]
/*!
 * =================================================================
 * APARATO: RATE LIMIT (V1.0 - GATE PIPELINE GOLD)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: TOKEN-BUCKET POR CLAVE COMPUESTA SOBRE EL KVS
 *
 * VISION HIPER-HOLÍSTICA:
 * Un solo consumo de token es la unidad atómica de este aparato: la
 * composición de clave (usuario, ip, ruta) vive aquí, pero la garantía
 * de que dos llamadas concurrentes nunca consuman el mismo token vive
 * en el `compare_and_swap` del KVS, no en este módulo.
 * =================================================================
 */

pub mod bucket;
pub mod key;

pub use bucket::{RateLimitDecision, RateLimitError, TokenBucketConfig, TokenBucketLimiter};
pub use key::RateLimitKey;
