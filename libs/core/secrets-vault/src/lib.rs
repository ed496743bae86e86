// [libs/core/secrets-vault/src/lib.rs]
/*!
 * =================================================================
 * APARATO: CONFIGURATION VAULT (V1.0 - GATE PIPELINE GOLD)
 * CLASIFICACIÓN: CORE SECURITY (ESTRATO L1)
 * RESPONSABILIDAD: ENSAMBLAJE Y REEMPLAZO ATOMICO DE NovaConfig
 *
 * VISION HIPER-HOLÍSTICA:
 * Una sola vista de NovaConfig compuesta en el arranque desde el entorno.
 * Reconfigurar nunca muta el struct en vivo: se construye un NovaConfig
 * nuevo y se reemplaza el Arc entero, el mismo patron clone-then-replace
 * que el Gate Pipeline usa para su estado inmutable por etapa.
 * =================================================================
 */

mod config;
mod handle;

pub use config::{ConfigError, GateTimeouts, NovaConfig, RateLimitConfig, RetentionConfig, RetentionPolicy, SsrfConfig};
pub use handle::ConfigHandle;
