// [libs/domain/models/src/sword.rs]
//! Sword domain entities (spec S3, S4.9): Goal/Quest/Step/Spark hierarchy.
//! Transition logic lives in `novaos-sword`; this crate only defines the
//! entities, their state enums and the side-effect vocabulary the store
//! processes.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Draft,
    Active,
    Paused,
    Completed,
    Abandoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestStatus {
    Draft,
    Active,
    Paused,
    Blocked,
    Completed,
    Abandoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Active,
    Completed,
    Missed,
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SparkStatus {
    Suggested,
    Accepted,
    Completed,
    Skipped,
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: Uuid,
    pub owner_user_id: String,
    pub status: GoalStatus,
    pub title: String,
    pub quest_ids: Vec<Uuid>,
    pub progress: f32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    pub id: Uuid,
    pub goal_id: Uuid,
    pub owner_user_id: String,
    pub status: QuestStatus,
    pub title: String,
    pub step_ids: Vec<Uuid>,
    pub progress: f32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: Uuid,
    pub quest_id: Uuid,
    pub owner_user_id: String,
    pub status: StepStatus,
    pub title: String,
    pub scheduled_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spark {
    pub id: Uuid,
    pub step_id: Uuid,
    pub owner_user_id: String,
    pub status: SparkStatus,
    pub escalation_level: u8,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The store applies a transition atomically, then processes these
/// side effects by re-reading the named target and recomputing aggregates
/// (spec S4.9). Transitions themselves never mutate a parent directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SideEffect {
    UpdateProgress { target: SwordEntityKind, id: Uuid },
    CascadeComplete { target: SwordEntityKind, id: Uuid },
    Emit { event_type: String, payload: serde_json::Value },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwordEntityKind {
    Goal,
    Quest,
    Step,
    Spark,
}
