// [libs/infra/secure-transport/src/errors.rs]
//! Failure catalogue. `SsrfDenied` is the only variant carrying a
//! Guard-assigned reason code; everything else is a transport-level fault.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("SSRF guard denied the request: {0}")]
    SsrfDenied(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("connect or read timeout exceeded")]
    Timeout,

    #[error("redirect loop detected at {0}")]
    RedirectLoopDetected(String),

    #[error("redirect chain exceeded the configured cap of {0} hops")]
    RedirectCapExceeded(u8),

    #[error("redirect response carried no Location header")]
    MissingRedirectLocation,

    #[error("redirect Location could not be resolved against the current URL: {0}")]
    MalformedRedirectLocation(String),
}
