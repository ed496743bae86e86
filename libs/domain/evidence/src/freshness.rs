// [libs/domain/evidence/src/freshness.rs]
//! Per-category staleness policy. Spec S4.5 requires every context item to
//! carry a `freshness: verified|stale` verdict but names no concrete
//! thresholds — the defaults below are this crate's own judgment call,
//! tuned to how fast each category actually moves.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct FreshnessPolicy {
    max_age_by_category: HashMap<String, Duration>,
    default_max_age: Duration,
}

impl FreshnessPolicy {
    pub fn new(default_max_age: Duration) -> Self {
        Self { max_age_by_category: HashMap::new(), default_max_age }
    }

    pub fn with_category(mut self, category: impl Into<String>, max_age: Duration) -> Self {
        self.max_age_by_category.insert(category.into(), max_age);
        self
    }

    pub fn is_stale(&self, category: &str, fetched_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let max_age = self.max_age_by_category.get(category).copied().unwrap_or(self.default_max_age);
        let age_secs = (now - fetched_at).num_seconds().max(0) as u64;
        age_secs > max_age.as_secs()
    }

    /// The freshness window a category will be judged against, in seconds —
    /// lets a caller surface the policy without needing its own copy.
    pub fn max_age_secs(&self, category: &str) -> u64 {
        self.max_age_by_category.get(category).copied().unwrap_or(self.default_max_age).as_secs()
    }
}

impl Default for FreshnessPolicy {
    /// Stock and crypto quotes move fastest so they get the tightest
    /// windows; weather and fx tolerate a much longer lag.
    fn default() -> Self {
        Self::new(Duration::from_secs(300))
            .with_category("stock", Duration::from_secs(60))
            .with_category("crypto", Duration::from_secs(30))
            .with_category("fx", Duration::from_secs(300))
            .with_category("weather", Duration::from_secs(1800))
            .with_category("time", Duration::from_secs(5))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    #[test]
    fn item_within_category_window_is_fresh() {
        let policy = FreshnessPolicy::default();
        let now = Utc::now();
        let fetched_at = now - ChronoDuration::seconds(10);
        assert!(!policy.is_stale("stock", fetched_at, now));
    }

    #[test]
    fn item_past_category_window_is_stale() {
        let policy = FreshnessPolicy::default();
        let now = Utc::now();
        let fetched_at = now - ChronoDuration::seconds(90);
        assert!(policy.is_stale("stock", fetched_at, now));
    }

    #[test]
    fn unknown_category_falls_back_to_the_default_window() {
        let policy = FreshnessPolicy::default();
        let now = Utc::now();
        let fetched_at = now - ChronoDuration::seconds(120);
        assert!(!policy.is_stale("unlisted-category", fetched_at, now));
    }

    #[test]
    fn clock_skew_into_the_future_is_never_stale() {
        let policy = FreshnessPolicy::default();
        let now = Utc::now();
        let fetched_at = now + ChronoDuration::seconds(30);
        assert!(!policy.is_stale("stock", fetched_at, now));
    }
}
