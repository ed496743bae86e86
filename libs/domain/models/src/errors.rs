// [libs/domain/models/src/errors.rs]
//! The sanitized error schema that crosses the public boundary (spec S6,
//! S7). Internal error detail — stack traces, gate names, policy versions —
//! never reaches a caller through this type.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiErrorCode {
    InvalidRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    RateLimited,
    ServiceError,
    Timeout,
    ContentBlocked,
    VerificationRequired,
    AcknowledgmentRequired,
}

impl ApiErrorCode {
    pub fn is_retryable_by_default(&self) -> bool {
        matches!(self, ApiErrorCode::RateLimited | ApiErrorCode::Timeout | ApiErrorCode::ServiceError)
    }
}

#[derive(Debug, Error, Clone, Serialize, Deserialize)]
#[error("{code:?}: {message}")]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
    pub request_id: Option<String>,
    pub retryable: bool,
    pub retry_after_ms: Option<u64>,
}

impl ApiError {
    pub fn new(code: ApiErrorCode, message: impl Into<String>) -> Self {
        let retryable = code.is_retryable_by_default();
        Self { code, message: message.into(), request_id: None, retryable, retry_after_ms: None }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_retry_after_ms(mut self, retry_after_ms: u64) -> Self {
        self.retry_after_ms = Some(retry_after_ms);
        self.retryable = true;
        self
    }
}

/// Internal, abstract taxonomy (spec S7) — never serialized over the wire.
/// Every variant must map to exactly one [`ApiErrorCode`] via
/// [`InternalFailure::sanitize`].
#[derive(Debug, Clone, Error)]
pub enum InternalFailure {
    #[error("invalid_input: {0}")]
    InvalidInput(String),
    #[error("unauthenticated")]
    Unauthenticated,
    #[error("forbidden")]
    Forbidden,
    #[error("rate_limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },
    #[error("provider_unavailable: {0}")]
    ProviderUnavailable(String),
    #[error("provider_timeout")]
    ProviderTimeout,
    #[error("ssrf_denied: {0}")]
    SsrfDenied(String),
    #[error("dns_failure: {0}")]
    DnsFailure(String),
    #[error("transport_failure: {0}")]
    TransportFailure(String),
    #[error("schema_violation: {0}")]
    SchemaViolation(String),
    #[error("classifier_failure: {0}")]
    ClassifierFailure(String),
    #[error("regeneration_exhausted")]
    RegenerationExhausted,
    #[error("storage_failure: {0}")]
    StorageFailure(String),
    #[error("lease_conflict")]
    LeaseConflict,
    #[error("encryption_failure: {0}")]
    EncryptionFailure(String),
    #[error("scheduler_handler_failure: {0}")]
    SchedulerHandlerFailure(String),
}

impl InternalFailure {
    /// The single mapping point from internal taxonomy to the public,
    /// sanitized schema (spec S7: "every public error is mapped via the
    /// sanitized-error table").
    pub fn sanitize(&self, request_id: impl Into<String>) -> ApiError {
        let request_id = request_id.into();
        let (code, message): (ApiErrorCode, &str) = match self {
            InternalFailure::InvalidInput(_) => (ApiErrorCode::InvalidRequest, "The request could not be processed."),
            InternalFailure::Unauthenticated => (ApiErrorCode::Unauthorized, "Authentication is required."),
            InternalFailure::Forbidden => (ApiErrorCode::Forbidden, "This action is not permitted."),
            InternalFailure::RateLimited { .. } => (ApiErrorCode::RateLimited, "Too many requests."),
            InternalFailure::ProviderUnavailable(_) | InternalFailure::ProviderTimeout => {
                (ApiErrorCode::ServiceError, "The service is temporarily unavailable.")
            }
            InternalFailure::SsrfDenied(_) | InternalFailure::DnsFailure(_) | InternalFailure::TransportFailure(_) => {
                (ApiErrorCode::ServiceError, "The requested data could not be retrieved.")
            }
            InternalFailure::SchemaViolation(_) => (ApiErrorCode::InvalidRequest, "The request shape was invalid."),
            InternalFailure::ClassifierFailure(_) => (ApiErrorCode::ServiceError, "The service is temporarily unavailable."),
            InternalFailure::RegenerationExhausted => (ApiErrorCode::ServiceError, "A well-formed response could not be produced."),
            InternalFailure::StorageFailure(_) | InternalFailure::LeaseConflict | InternalFailure::EncryptionFailure(_) => {
                (ApiErrorCode::ServiceError, "The service is temporarily unavailable.")
            }
            InternalFailure::SchedulerHandlerFailure(_) => (ApiErrorCode::ServiceError, "The service is temporarily unavailable."),
        };

        let mut error = ApiError::new(code, message).with_request_id(request_id);
        if let InternalFailure::RateLimited { retry_after_ms } = self {
            error = error.with_retry_after_ms(*retry_after_ms);
        }
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitized_error_never_leaks_internal_detail() {
        let failure = InternalFailure::StorageFailure("redis connection refused at 10.0.0.4:6379".to_string());
        let sanitized = failure.sanitize("req-1");
        assert!(!sanitized.message.contains("10.0.0.4"));
        assert_eq!(sanitized.code, ApiErrorCode::ServiceError);
    }

    #[test]
    fn rate_limited_carries_retry_after() {
        let failure = InternalFailure::RateLimited { retry_after_ms: 2_500 };
        let sanitized = failure.sanitize("req-2");
        assert_eq!(sanitized.code, ApiErrorCode::RateLimited);
        assert_eq!(sanitized.retry_after_ms, Some(2_500));
        assert!(sanitized.retryable);
    }
}
