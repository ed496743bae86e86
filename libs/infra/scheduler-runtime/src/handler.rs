// [libs/infra/scheduler-runtime/src/handler.rs]
//! The seam every job body plugs into. `scheduler-worker` supplies one
//! `JobHandler` per `JobId`; this crate owns everything around it — due-time
//! computation, leasing, retry — and never looks at what a handler does.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use novaos_models::JobId;

/// What a handler is told about the tick it was woken for. `scheduled_for`
/// is the due instant, not wall-clock `now` — handlers that key their work
/// off "today" must use this, not `Utc::now()`, so a retried attempt hours
/// later still targets the original tick (idempotence, spec S4.10).
#[derive(Debug, Clone)]
pub struct JobRunContext {
    pub job_id: JobId,
    pub tick: String,
    pub scheduled_for: DateTime<Utc>,
    pub attempt: u32,
}

#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn run(&self, ctx: &JobRunContext) -> Result<(), String>;
}
