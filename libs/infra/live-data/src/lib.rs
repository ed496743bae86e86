// [libs/infra/live-data/src/lib.rs]
/*!
 * =================================================================
 * APARATO: LIVE-DATA PROVIDERS (V1.0 - GATE PIPELINE GOLD)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L4)
 * RESPONSABILIDAD: SEIS FETCHERS DE CATEGORIA QUE CIERRAN EL CONTRATO
 * `CapabilityProvider` DE EVIDENCE
 *
 * VISION HIPER-HOLÍSTICA:
 * Cada fetcher es el unico lugar del sistema que sabe el shape JSON de un
 * proveedor externo concreto; todo lo que hay antes (SSRF Guard) y
 * durante (Secure Transport) la llamada es compartido e indiferente a
 * cual fetcher lo invoca.
 * =================================================================
 */

mod crypto;
mod errors;
mod fetch;
mod fx;
mod stock;
mod testutil;
mod time;
mod weather;
mod web_search;

pub use crypto::CryptoFetcher;
pub use errors::LiveDataError;
pub use fx::FxFetcher;
pub use stock::StockFetcher;
pub use time::TimeFetcher;
pub use weather::WeatherFetcher;
pub use web_search::WebSearcher;
