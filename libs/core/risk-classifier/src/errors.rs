// [libs/core/risk-classifier/src/errors.rs]
//! Failure catalogue for Shield classifier output parsing.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClassificationError {
    #[error("classifier response was not valid JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("confidence {0} is outside the [0, 1] range")]
    ConfidenceOutOfRange(f64),
}
