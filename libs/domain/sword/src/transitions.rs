// [libs/domain/sword/src/transitions.rs]
//! Pure per-entity transitions (spec S4.9). Each `apply_*_event` takes the
//! current entity by reference and returns a clone carrying the new
//! status plus the side effects the store must process — never a
//! mutation, never a KVS call. Invalid (status, event) pairs are a
//! `TransitionError`, not a panic: callers (the store, eventually the
//! gateway) decide how to surface that to the caller.

use chrono::Utc;
use novaos_models::{Goal, GoalStatus, Quest, QuestStatus, SideEffect, Spark, SparkStatus, Step, StepStatus, SwordEntityKind};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalEvent {
    Activate,
    Pause,
    Resume,
    Complete,
    Abandon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestEvent {
    Activate,
    Pause,
    Resume,
    Block,
    Unblock,
    Complete,
    Abandon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepEvent {
    Activate,
    Complete,
    Miss,
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SparkEvent {
    Accept,
    Complete,
    Skip,
    Expire,
}

#[derive(Debug, Error)]
#[error("{event} is not a valid event from status {status}")]
pub struct TransitionError {
    status: String,
    event: String,
}

fn invalid(status: impl std::fmt::Debug, event: impl std::fmt::Debug) -> TransitionError {
    TransitionError { status: format!("{status:?}"), event: format!("{event:?}") }
}

pub fn apply_goal_event(goal: &Goal, event: GoalEvent) -> Result<(Goal, Vec<SideEffect>), TransitionError> {
    use GoalEvent::*;
    use GoalStatus::*;
    let new_status = match (goal.status, event) {
        (Draft, Activate) => Active,
        (Active, Pause) => Paused,
        (Paused, Resume) => Active,
        (Active, Complete) => Completed,
        (Draft, Abandon) | (Active, Abandon) | (Paused, Abandon) => Abandoned,
        (status, event) => return Err(invalid(status, event)),
    };
    let mut updated = goal.clone();
    updated.status = new_status;
    updated.updated_at = Utc::now();
    Ok((updated, Vec::new()))
}

pub fn apply_quest_event(quest: &Quest, event: QuestEvent) -> Result<(Quest, Vec<SideEffect>), TransitionError> {
    use QuestEvent::*;
    use QuestStatus::*;
    let new_status = match (quest.status, event) {
        (Draft, Activate) => Active,
        (Active, Pause) => Paused,
        (Paused, Resume) => Active,
        (Active, Block) => Blocked,
        (Blocked, Unblock) => Active,
        (Active, Complete) => Completed,
        (Draft, Abandon) | (Active, Abandon) | (Paused, Abandon) | (Blocked, Abandon) => Abandoned,
        (status, event) => return Err(invalid(status, event)),
    };
    let mut updated = quest.clone();
    updated.status = new_status;
    updated.updated_at = Utc::now();
    let side_effects = if matches!(new_status, Completed) {
        vec![SideEffect::UpdateProgress { target: SwordEntityKind::Goal, id: updated.goal_id }]
    } else {
        Vec::new()
    };
    Ok((updated, side_effects))
}

pub fn apply_step_event(step: &Step, event: StepEvent) -> Result<(Step, Vec<SideEffect>), TransitionError> {
    use StepEvent::*;
    use StepStatus::*;
    let new_status = match (step.status, event) {
        (Pending, Activate) => Active,
        (Pending, Complete) | (Active, Complete) => Completed,
        (Pending, Miss) | (Active, Miss) => Missed,
        (Pending, Skip) | (Active, Skip) => Skipped,
        (status, event) => return Err(invalid(status, event)),
    };
    let mut updated = step.clone();
    updated.status = new_status;
    updated.updated_at = Utc::now();
    let side_effects = vec![SideEffect::UpdateProgress { target: SwordEntityKind::Quest, id: updated.quest_id }];
    Ok((updated, side_effects))
}

pub fn apply_spark_event(spark: &Spark, event: SparkEvent) -> Result<(Spark, Vec<SideEffect>), TransitionError> {
    use SparkEvent::*;
    use SparkStatus::*;
    let new_status = match (spark.status, event) {
        (Suggested, Accept) => Accepted,
        (Accepted, Complete) => Completed,
        (Suggested, Skip) | (Accepted, Skip) => Skipped,
        (Suggested, Expire) | (Accepted, Expire) => Expired,
        (status, event) => return Err(invalid(status, event)),
    };
    let mut updated = spark.clone();
    updated.status = new_status;
    updated.updated_at = Utc::now();
    Ok((updated, Vec::new()))
}
