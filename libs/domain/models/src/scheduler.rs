// [libs/domain/models/src/scheduler.rs]
//! Spark Scheduler job contract (spec S3 Job/JobExecution, S4.10).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobId {
    GenerateDailySteps,
    MorningSparks,
    ReminderEscalation,
    DayEndReconciliation,
    KnownSourcesHealth,
    RetentionEnforcement,
}

impl JobId {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobId::GenerateDailySteps => "generate_daily_steps",
            JobId::MorningSparks => "morning_sparks",
            JobId::ReminderEscalation => "reminder_escalation",
            JobId::DayEndReconciliation => "day_end_reconciliation",
            JobId::KnownSourcesHealth => "known_sources_health",
            JobId::RetentionEnforcement => "retention_enforcement",
        }
    }

    pub fn all() -> [JobId; 6] {
        [
            JobId::GenerateDailySteps,
            JobId::MorningSparks,
            JobId::ReminderEscalation,
            JobId::DayEndReconciliation,
            JobId::KnownSourcesHealth,
            JobId::RetentionEnforcement,
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Schedule {
    Cron { expression: String },
    Interval { every_ms: u64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl RetryPolicy {
    pub fn backoff_for_attempt(&self, attempt: u32) -> u64 {
        let exp = self.base_backoff_ms.saturating_mul(1u64 << attempt.min(16));
        exp.min(self.max_backoff_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSpec {
    pub id: JobId,
    pub schedule: Schedule,
    pub lease_duration_ms: u64,
    pub retry_policy: RetryPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobExecutionResult {
    Success,
    Failed,
    LeaseConflict,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobExecution {
    pub execution_id: String,
    pub job_id: JobId,
    pub tick: String,
    pub started_at: DateTime<Utc>,
    pub lease_expires_at: DateTime<Utc>,
    pub attempt: u32,
    pub result: Option<JobExecutionResult>,
}
