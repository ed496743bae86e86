// [libs/domain/reminders/src/escalation.rs]
//! Pure age-to-level computation (spec S4.10 `reminder_escalation`):
//! `targetLevel = min(floor(ageHours / 3), 3)`. No IO, no KVS — kept
//! separate from `notification` so the formula is trivially unit-tested
//! without a fake store.

use chrono::{DateTime, Utc};

const ESCALATION_STEP_HOURS: f64 = 3.0;
const MAX_ESCALATION_LEVEL: u8 = 3;

/// `age` is `now - created_at`; negative ages (clock skew, a spark created
/// in the future) clamp to level 0 rather than underflowing.
pub fn target_escalation_level(created_at: DateTime<Utc>, now: DateTime<Utc>) -> u8 {
    let age_hours = (now - created_at).num_seconds() as f64 / 3600.0;
    if age_hours <= 0.0 {
        return 0;
    }
    let level = (age_hours / ESCALATION_STEP_HOURS).floor();
    if level >= MAX_ESCALATION_LEVEL as f64 {
        MAX_ESCALATION_LEVEL
    } else {
        level as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn fresh_spark_is_level_zero() {
        let created = Utc::now();
        assert_eq!(target_escalation_level(created, created), 0);
    }

    #[test]
    fn each_three_hour_step_bumps_the_level() {
        let created = Utc::now();
        assert_eq!(target_escalation_level(created, created + Duration::hours(2)), 0);
        assert_eq!(target_escalation_level(created, created + Duration::hours(3)), 1);
        assert_eq!(target_escalation_level(created, created + Duration::hours(6)), 2);
        assert_eq!(target_escalation_level(created, created + Duration::hours(9)), 3);
    }

    #[test]
    fn level_is_capped_at_three_no_matter_how_stale() {
        let created = Utc::now();
        assert_eq!(target_escalation_level(created, created + Duration::days(5)), 3);
    }

    #[test]
    fn future_created_at_clamps_to_zero_instead_of_underflowing() {
        let created = Utc::now();
        assert_eq!(target_escalation_level(created, created - Duration::hours(1)), 0);
    }
}
