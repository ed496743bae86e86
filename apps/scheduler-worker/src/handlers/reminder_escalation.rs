// [apps/scheduler-worker/src/handlers/reminder_escalation.rs]
//! `reminder_escalation` (spec S4.10): every 3h, bump stale sparks and
//! enqueue notifications. The computation itself lives in
//! `novaos-reminders::ReminderEscalationJob`; this is just the registry seam.

use async_trait::async_trait;
use novaos_reminders::ReminderEscalationJob;
use novaos_scheduler_runtime::{JobHandler, JobRunContext};

pub struct ReminderEscalationHandler {
    job: ReminderEscalationJob,
}

impl ReminderEscalationHandler {
    pub fn new(job: ReminderEscalationJob) -> Self {
        Self { job }
    }
}

#[async_trait]
impl JobHandler for ReminderEscalationHandler {
    async fn run(&self, ctx: &JobRunContext) -> Result<(), String> {
        let summary = self.job.run(ctx.scheduled_for).await.map_err(|error| error.to_string())?;
        tracing::info!(tick = %ctx.tick, considered = summary.considered, escalated = summary.escalated, "reminder escalation swept");
        Ok(())
    }
}
