// [libs/domain/cognition/src/errors.rs]
//! Failure catalogue for the provider chain and the Constitutional
//! Validator. Both halves of this crate fail open by design (spec S4.6's
//! "deterministic stub always succeeds", spec S4.7's "parse errors or API
//! errors ⇒ fail-open") so the only errors that ever surface are exhausted
//! fallback chains, which the Model gate treats as fatal.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CognitionError {
    #[error("every provider in the fallback chain failed or was unavailable")]
    ChainExhausted,

    #[error("provider {0} returned empty content")]
    EmptyContent(String),

    #[error("provider {0} returned a non-success status: {1}")]
    NonSuccessStatus(String, String),
}
