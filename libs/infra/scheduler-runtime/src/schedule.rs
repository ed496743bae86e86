// [libs/infra/scheduler-runtime/src/schedule.rs]
//! Due-time computation for `Schedule` (spec S4.10 step 1). Cron support is
//! intentionally a minimal subset: a fixed daily `"M H * * *"` time and a
//! `"*/N * * * *"` step interval. The six named jobs are all describable
//! with `Interval` or one of these two forms, and nothing in this workspace
//! (or the wider retrieval pack) carries a general-purpose cron parser to
//! reach for instead — see DESIGN.md for the Open Question this resolves.

use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Timelike, Utc};
use novaos_models::Schedule;

use crate::errors::SchedulerError;

/// First instant at or after `after` that `schedule` fires.
pub fn next_due_after(schedule: &Schedule, after: DateTime<Utc>) -> Result<DateTime<Utc>, SchedulerError> {
    match schedule {
        Schedule::Interval { every_ms } => Ok(after + ChronoDuration::milliseconds(*every_ms as i64)),
        Schedule::Cron { expression } => next_cron_due(expression, after),
    }
}

fn next_cron_due(expression: &str, after: DateTime<Utc>) -> Result<DateTime<Utc>, SchedulerError> {
    let fields: Vec<&str> = expression.split_whitespace().collect();
    let unsupported = || SchedulerError::UnsupportedCronExpression(expression.to_string());
    if fields.len() != 5 || fields[2] != "*" || fields[3] != "*" || fields[4] != "*" {
        return Err(unsupported());
    }

    if let Some(step) = fields[0].strip_prefix("*/") {
        if fields[1] != "*" {
            return Err(unsupported());
        }
        let every_minutes: i64 = step.parse().map_err(|_| unsupported())?;
        if every_minutes <= 0 {
            return Err(unsupported());
        }
        let top_of_next_minute = (after + ChronoDuration::minutes(1))
            .with_second(0)
            .and_then(|d| d.with_nanosecond(0))
            .ok_or_else(unsupported)?;
        let minute = top_of_next_minute.minute() as i64;
        let remainder = minute % every_minutes;
        let add = if remainder == 0 { 0 } else { every_minutes - remainder };
        return Ok(top_of_next_minute + ChronoDuration::minutes(add));
    }

    let (minute, hour): (u32, u32) = match (fields[0].parse(), fields[1].parse()) {
        (Ok(m), Ok(h)) => (m, h),
        _ => return Err(unsupported()),
    };
    let today_naive = after.date_naive().and_hms_opt(hour, minute, 0).ok_or_else(unsupported)?;
    let today = Utc.from_utc_datetime(&today_naive);
    Ok(if today > after { today } else { today + ChronoDuration::days(1) })
}
