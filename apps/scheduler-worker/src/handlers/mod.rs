// [apps/scheduler-worker/src/handlers/mod.rs]
//! One `JobHandler` per Spark Scheduler job (spec S4.10), registered against
//! a `JobRegistry` in `bootstrap`.

mod support;

mod day_end_reconciliation;
mod generate_daily_steps;
mod known_sources_health;
mod morning_sparks;
mod reminder_escalation;
mod retention_enforcement;

pub use day_end_reconciliation::DayEndReconciliationHandler;
pub use generate_daily_steps::GenerateDailyStepsHandler;
pub use known_sources_health::KnownSourcesHealthHandler;
pub use morning_sparks::MorningSparksHandler;
pub use reminder_escalation::ReminderEscalationHandler;
pub use retention_enforcement::RetentionEnforcementHandler;
