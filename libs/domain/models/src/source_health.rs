// [libs/domain/models/src/source_health.rs]
//! Health record for a live-data provider category (spec S4.10 supplement
//! to `known_sources_health`): a consecutive-failure counter and the
//! derived status, persisted at `lens:source:{id}`. The counter is kept
//! current by Secure Transport on every call; the weekly flip/re-enable
//! rule itself belongs to the scheduler job, not to this type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
    Active,
    Degraded,
    Failed,
    Disabled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceHealth {
    pub id: String,
    pub status: SourceStatus,
    pub consecutive_failures: u32,
    pub disabled_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl SourceHealth {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), status: SourceStatus::Active, consecutive_failures: 0, disabled_at: None, updated_at: Utc::now() }
    }
}
