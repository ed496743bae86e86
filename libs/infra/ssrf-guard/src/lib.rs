// [libs/infra/ssrf-guard/src/lib.rs]
/*!
 * =================================================================
 * APARATO: SSRF GUARD (V1.0 - GATE PIPELINE GOLD)
 * CLASIFICACIÓN: INFRASTRUCTURE SECURITY (ESTRATO L3)
 * RESPONSABILIDAD: UNICA AUTORIDAD SOBRE SI UNA URL PUEDE SER ALCANZADA
 *
 * VISION HIPER-HOLÍSTICA:
 * El Guard es la unica fuente de verdad que consulta Secure Transport.
 * Produce una SSRFDecision inmutable con el IP exacto a marcar; Transport
 * jamas vuelve a resolver DNS. Esto cierra la ventana de DNS-rebinding
 * entre el chequeo y el uso.
 * =================================================================
 */

mod config;
mod dns;
mod guard;
mod hostname;
mod ip_classify;
mod rate_limit;

pub use config::SsrfGuardConfig;
pub use dns::{DnsError, DnsResolver, TokioDnsResolver};
pub use guard::SsrfGuard;
pub use ip_classify::{classify_ip, IpClassification};
pub use rate_limit::{NoopRateLimitGate, RateLimitGate};
