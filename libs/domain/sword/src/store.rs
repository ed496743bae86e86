// [libs/domain/sword/src/store.rs]
//! KVS-backed persistence (spec S4.9 persistence keys) and the side-effect
//! drain loop: `transitions` decides what changed and what it implies,
//! this module is the only place that re-reads a parent, recomputes its
//! aggregate, and — if that recompute crosses into 100% on an active
//! entity — runs the cascade transition too, looping until the effect
//! queue is empty.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use novaos_kvs::KeyValueStore;
use novaos_models::{Goal, Quest, QuestStatus, SideEffect, Spark, SparkStatus, Step, SwordEntityKind};
use novaos_reminders::SparkEscalationStore;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::progress::{maybe_cascade_complete, recompute_goal_progress, recompute_quest_progress};
use crate::transitions::{apply_goal_event, apply_quest_event, GoalEvent, QuestEvent, TransitionError};

const GOAL_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);
const QUEST_STEP_TTL: Duration = Duration::from_secs(180 * 24 * 60 * 60);
const SPARK_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} {1} not found")]
    NotFound(&'static str, Uuid),
    #[error("failed to (de)serialize {0}: {1}")]
    Serialization(&'static str, serde_json::Error),
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

pub struct SwordStore {
    kvs: Arc<dyn KeyValueStore>,
}

impl SwordStore {
    pub fn new(kvs: Arc<dyn KeyValueStore>) -> Self {
        Self { kvs }
    }

    pub async fn save_goal(&self, goal: &Goal) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(goal).map_err(|e| StoreError::Serialization("goal", e))?;
        self.kvs.set_with_ttl(&format!("sword:goal:{}", goal.id), bytes, Some(GOAL_TTL)).await;
        self.kvs.set_add(&format!("sword:user:{}:goals", goal.owner_user_id), &goal.id.to_string()).await;
        Ok(())
    }

    pub async fn load_goal(&self, id: Uuid) -> Result<Option<Goal>, StoreError> {
        self.load(&format!("sword:goal:{id}"), "goal").await
    }

    pub async fn save_quest(&self, quest: &Quest) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(quest).map_err(|e| StoreError::Serialization("quest", e))?;
        self.kvs.set_with_ttl(&format!("sword:quest:{}", quest.id), bytes, Some(QUEST_STEP_TTL)).await;
        self.kvs.set_add(&format!("sword:goal:{}:quests", quest.goal_id), &quest.id.to_string()).await;
        Ok(())
    }

    pub async fn load_quest(&self, id: Uuid) -> Result<Option<Quest>, StoreError> {
        self.load(&format!("sword:quest:{id}"), "quest").await
    }

    pub async fn save_step(&self, step: &Step) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(step).map_err(|e| StoreError::Serialization("step", e))?;
        self.kvs.set_with_ttl(&format!("sword:step:{}", step.id), bytes, Some(QUEST_STEP_TTL)).await;
        self.kvs
            .set_add(&format!("sword:step:date:{}:{}", step.scheduled_date, step.quest_id), &step.id.to_string())
            .await;
        Ok(())
    }

    pub async fn load_step(&self, id: Uuid) -> Result<Option<Step>, StoreError> {
        self.load(&format!("sword:step:{id}"), "step").await
    }

    pub async fn save_spark(&self, spark: &Spark) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(spark).map_err(|e| StoreError::Serialization("spark", e))?;
        self.kvs.set_with_ttl(&format!("sword:spark:{}", spark.id), bytes, Some(SPARK_TTL)).await;
        self.kvs.set_add(&format!("sword:user:{}:sparks", spark.owner_user_id), &spark.id.to_string()).await;
        Ok(())
    }

    pub async fn load_spark(&self, id: Uuid) -> Result<Option<Spark>, StoreError> {
        self.load(&format!("sword:spark:{id}"), "spark").await
    }

    pub async fn user_goal_ids(&self, user_id: &str) -> Vec<String> {
        self.kvs.set_members(&format!("sword:user:{user_id}:goals")).await
    }

    pub async fn goal_quest_ids(&self, goal_id: Uuid) -> Vec<String> {
        self.kvs.set_members(&format!("sword:goal:{goal_id}:quests")).await
    }

    pub async fn step_ids_for_quest_on(&self, quest_id: Uuid, date: chrono::NaiveDate) -> Vec<String> {
        self.kvs.set_members(&format!("sword:step:date:{date}:{quest_id}")).await
    }

    pub async fn user_spark_ids(&self, user_id: &str) -> Vec<String> {
        self.kvs.set_members(&format!("sword:user:{user_id}:sparks")).await
    }

    /// Enumerates every user that owns at least one goal. Like
    /// `active_sparks`, this walks the KVS rather than a dedicated `users`
    /// set, because no such set is named in the persistence keys this crate
    /// is grounded on; the scheduler only needs this once per job tick so
    /// the scan cost is acceptable.
    pub async fn all_user_ids(&self) -> Vec<String> {
        let keys = self.kvs.scan_by_pattern("sword:user:*:goals").await;
        keys.into_iter()
            .filter_map(|key| key.strip_prefix("sword:user:").and_then(|rest| rest.strip_suffix(":goals")).map(str::to_string))
            .collect()
    }

    async fn load<T: serde::de::DeserializeOwned>(&self, key: &str, label: &'static str) -> Result<Option<T>, StoreError> {
        match self.kvs.get(key).await {
            Some(bytes) => serde_json::from_slice(&bytes).map(Some).map_err(|e| StoreError::Serialization(label, e)),
            None => Ok(None),
        }
    }

    /// Applies a step transition, persists it, then drains every side
    /// effect it and its cascades produce — looping until quiescent.
    pub async fn apply_step_transition(
        &self,
        step_id: Uuid,
        event: crate::transitions::StepEvent,
    ) -> Result<(), StoreError> {
        let step = self.load_step(step_id).await?.ok_or(StoreError::NotFound("step", step_id))?;
        let (updated, effects) = crate::transitions::apply_step_event(&step, event)?;
        self.save_step(&updated).await?;
        self.drain(effects.into()).await
    }

    async fn drain(&self, mut queue: VecDeque<SideEffect>) -> Result<(), StoreError> {
        while let Some(effect) = queue.pop_front() {
            match effect {
                SideEffect::UpdateProgress { target: SwordEntityKind::Quest, id } => {
                    let mut quest = self.load_quest(id).await?.ok_or(StoreError::NotFound("quest", id))?;
                    let mut step_statuses = Vec::with_capacity(quest.step_ids.len());
                    for step_id in &quest.step_ids {
                        if let Some(step) = self.load_step(*step_id).await? {
                            step_statuses.push(step.status);
                        }
                    }
                    quest.progress = recompute_quest_progress(&step_statuses);
                    let is_active = quest.status == QuestStatus::Active;
                    let goal_id = quest.goal_id;
                    self.save_quest(&quest).await?;

                    if let Some(cascade) = maybe_cascade_complete(SwordEntityKind::Quest, quest.id, is_active, quest.progress) {
                        queue.push_back(cascade);
                    }
                    queue.push_back(SideEffect::UpdateProgress { target: SwordEntityKind::Goal, id: goal_id });
                }
                SideEffect::UpdateProgress { target: SwordEntityKind::Goal, id } => {
                    let mut goal = self.load_goal(id).await?.ok_or(StoreError::NotFound("goal", id))?;
                    let mut quest_progresses = Vec::with_capacity(goal.quest_ids.len());
                    for quest_id in &goal.quest_ids {
                        if let Some(quest) = self.load_quest(*quest_id).await? {
                            quest_progresses.push(quest.progress);
                        }
                    }
                    goal.progress = recompute_goal_progress(&quest_progresses);
                    let is_active = goal.status == novaos_models::GoalStatus::Active;
                    let progress = goal.progress;
                    let goal_id = goal.id;
                    self.save_goal(&goal).await?;

                    if let Some(cascade) = maybe_cascade_complete(SwordEntityKind::Goal, goal_id, is_active, progress) {
                        queue.push_back(cascade);
                    }
                }
                SideEffect::UpdateProgress { target: SwordEntityKind::Step | SwordEntityKind::Spark, .. } => {
                    // Step and Spark have no children whose completion feeds a
                    // progress computation of their own.
                }
                SideEffect::CascadeComplete { target: SwordEntityKind::Quest, id } => {
                    let quest = self.load_quest(id).await?.ok_or(StoreError::NotFound("quest", id))?;
                    let (updated, _effects) = apply_quest_event(&quest, QuestEvent::Complete)?;
                    self.save_quest(&updated).await?;
                }
                SideEffect::CascadeComplete { target: SwordEntityKind::Goal, id } => {
                    let goal = self.load_goal(id).await?.ok_or(StoreError::NotFound("goal", id))?;
                    let (updated, _effects) = apply_goal_event(&goal, GoalEvent::Complete)?;
                    self.save_goal(&updated).await?;
                }
                SideEffect::CascadeComplete { target: SwordEntityKind::Step | SwordEntityKind::Spark, .. } => {}
                SideEffect::Emit { event_type, payload } => {
                    tracing::debug!(event_type = %event_type, ?payload, "sword side effect emitted, no core subscriber");
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl SparkEscalationStore for SwordStore {
    async fn active_sparks(&self) -> Vec<Spark> {
        // `scan_by_pattern` is the only enumeration primitive the KVS
        // contract offers; a production backend would keep a dedicated
        // `sword:sparks:active` set the way goals are indexed per user,
        // but that index isn't named anywhere in the persistence keys
        // this crate is grounded on, so the scan is the honest choice.
        let keys = self.kvs.scan_by_pattern("sword:spark:*").await;
        let mut sparks = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(bytes) = self.kvs.get(&key).await {
                if let Ok(spark) = serde_json::from_slice::<Spark>(&bytes) {
                    if !matches!(spark.status, SparkStatus::Completed | SparkStatus::Skipped | SparkStatus::Expired) {
                        sparks.push(spark);
                    }
                }
            }
        }
        sparks
    }

    async fn set_escalation_level(&self, spark_id: Uuid, level: u8) -> Result<(), String> {
        let mut spark = self.load_spark(spark_id).await.map_err(|e| e.to_string())?.ok_or("spark not found".to_string())?;
        spark.escalation_level = level;
        self.save_spark(&spark).await.map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use novaos_kvs::MemoryStore;
    use novaos_models::{GoalStatus, StepStatus};

    fn store() -> SwordStore {
        let kvs: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        SwordStore::new(kvs)
    }

    fn new_goal(owner: &str) -> Goal {
        Goal {
            id: Uuid::new_v4(),
            owner_user_id: owner.to_string(),
            status: GoalStatus::Active,
            title: "run a marathon".to_string(),
            quest_ids: vec![],
            progress: 0.0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn new_quest(goal_id: Uuid) -> Quest {
        Quest {
            id: Uuid::new_v4(),
            goal_id,
            owner_user_id: "u1".to_string(),
            status: QuestStatus::Active,
            title: "build base mileage".to_string(),
            step_ids: vec![],
            progress: 0.0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn new_step(quest_id: Uuid, status: StepStatus) -> Step {
        Step {
            id: Uuid::new_v4(),
            quest_id,
            owner_user_id: "u1".to_string(),
            status,
            title: "run 5k".to_string(),
            scheduled_date: Utc::now().date_naive(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn completing_every_step_cascades_to_quest_and_goal_completion() {
        let store = store();
        let mut goal = new_goal("u1");
        let mut quest = new_quest(goal.id);
        let step_a = new_step(quest.id, StepStatus::Active);
        let step_b = new_step(quest.id, StepStatus::Active);
        quest.step_ids = vec![step_a.id, step_b.id];
        goal.quest_ids = vec![quest.id];

        store.save_goal(&goal).await.unwrap();
        store.save_quest(&quest).await.unwrap();
        store.save_step(&step_a).await.unwrap();
        store.save_step(&step_b).await.unwrap();

        store.apply_step_transition(step_a.id, crate::transitions::StepEvent::Complete).await.unwrap();
        let quest_after_first = store.load_quest(quest.id).await.unwrap().unwrap();
        assert_eq!(quest_after_first.progress, 0.5);
        assert_eq!(quest_after_first.status, QuestStatus::Active);

        store.apply_step_transition(step_b.id, crate::transitions::StepEvent::Complete).await.unwrap();
        let quest_after_second = store.load_quest(quest.id).await.unwrap().unwrap();
        assert_eq!(quest_after_second.progress, 1.0);
        assert_eq!(quest_after_second.status, QuestStatus::Completed);

        let goal_after = store.load_goal(goal.id).await.unwrap().unwrap();
        assert_eq!(goal_after.progress, 1.0);
        assert_eq!(goal_after.status, GoalStatus::Completed);
    }

    #[tokio::test]
    async fn goal_is_indexed_under_its_owner() {
        let store = store();
        let goal = new_goal("u1");
        store.save_goal(&goal).await.unwrap();
        assert_eq!(store.user_goal_ids("u1").await, vec![goal.id.to_string()]);
    }

    #[tokio::test]
    async fn quest_is_indexed_under_its_goal_and_step_under_quest_and_date() {
        let store = store();
        let goal = new_goal("u1");
        let quest = new_quest(goal.id);
        let step = new_step(quest.id, StepStatus::Pending);

        store.save_quest(&quest).await.unwrap();
        store.save_step(&step).await.unwrap();

        assert_eq!(store.goal_quest_ids(goal.id).await, vec![quest.id.to_string()]);
        assert_eq!(store.step_ids_for_quest_on(quest.id, step.scheduled_date).await, vec![step.id.to_string()]);
    }

    #[tokio::test]
    async fn all_user_ids_reflects_goal_ownership() {
        let store = store();
        store.save_goal(&new_goal("u1")).await.unwrap();
        store.save_goal(&new_goal("u2")).await.unwrap();

        let mut users = store.all_user_ids().await;
        users.sort();
        assert_eq!(users, vec!["u1".to_string(), "u2".to_string()]);
    }

    #[tokio::test]
    async fn spark_escalation_store_skips_terminal_sparks() {
        let store = store();
        let active = Spark {
            id: Uuid::new_v4(),
            step_id: Uuid::new_v4(),
            owner_user_id: "u1".to_string(),
            status: SparkStatus::Accepted,
            escalation_level: 0,
            title: "stretch".to_string(),
            created_at: Utc::now(),
            expires_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let mut expired = active.clone();
        expired.id = Uuid::new_v4();
        expired.status = SparkStatus::Expired;

        store.save_spark(&active).await.unwrap();
        store.save_spark(&expired).await.unwrap();

        let sparks = SparkEscalationStore::active_sparks(&store).await;
        assert_eq!(sparks.len(), 1);
        assert_eq!(sparks[0].id, active.id);
    }
}
