// [libs/infra/secure-transport/src/lib.rs]
/*!
 * =================================================================
 * APARATO: SECURE TRANSPORT (V1.0 - GATE PIPELINE GOLD)
 * CLASIFICACIÓN: INFRASTRUCTURE SECURITY (ESTRATO L3)
 * RESPONSABILIDAD: EJECUCIÓN DEL FETCH ANCLADO AL IP DECIDIDO POR EL GUARD
 *
 * VISION HIPER-HOLÍSTICA:
 * Transport jamas decide si una URL es alcanzable — solo ejecuta lo que
 * el Guard ya decidio, y jamas vuelve a resolver DNS. Cada salto de
 * redireccion es una nueva decision del Guard, nunca un salto de socket
 * silencioso.
 * =================================================================
 */

mod errors;
mod executor;
mod source_health;
mod transport;

pub use errors::TransportError;
pub use executor::{RawResponse, ReqwestTransportExecutor, TransportExecutor};
pub use transport::{FetchOutcome, SecureTransport};
