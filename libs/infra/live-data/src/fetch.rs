// [libs/infra/live-data/src/fetch.rs]
//! The one path every fetcher in this crate goes through: SSRF Guard +
//! Secure Transport, then a JSON parse. No fetcher touches `reqwest`
//! directly — `SecureTransport` is handed in by the caller, so tests
//! substitute a scripted executor instead of a socket.

use novaos_secure_transport::SecureTransport;

use crate::errors::LiveDataError;

pub(crate) async fn fetch_json(transport: &SecureTransport, url: &str, rate_limit_key: &str) -> Result<serde_json::Value, LiveDataError> {
    let outcome = transport.fetch(url, rate_limit_key, None).await?;
    serde_json::from_slice(&outcome.body).map_err(|e| LiveDataError::MalformedResponse(e.to_string()))
}
