// [libs/infra/live-data/src/errors.rs]
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LiveDataError {
    #[error("transport error: {0}")]
    Transport(#[from] novaos_secure_transport::TransportError),
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
    #[error("provider response missing field: {0}")]
    MissingField(&'static str),
}
