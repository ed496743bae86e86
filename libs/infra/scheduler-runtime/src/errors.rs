// [libs/infra/scheduler-runtime/src/errors.rs]
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("unsupported cron expression: {0}")]
    UnsupportedCronExpression(String),

    #[error("handler for job {0:?} failed: {1}")]
    HandlerFailed(novaos_models::JobId, String),

    #[error("handler for job {0:?} timed out")]
    HandlerTimedOut(novaos_models::JobId),
}
