// [apps/scheduler-worker/src/handlers/day_end_reconciliation.rs]
//! `day_end_reconciliation` (spec S4.10): mark uncompleted today-steps
//! `missed`, break the owning goal's streak, and expire whatever sparks
//! those steps still carried. A goal with nothing missed today has its
//! streak carried forward by one instead — the streak key (spec S6
//! `sword:streak:{uid}:{gid}`) has no source beyond that name, so this
//! reset/increment pair is this handler's own design (see DESIGN.md).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use novaos_kvs::KeyValueStore;
use novaos_models::{SparkStatus, StepStatus};
use novaos_scheduler_runtime::{JobHandler, JobRunContext};
use novaos_sword::{apply_spark_event, SparkEvent, StepEvent, SwordStore};
use uuid::Uuid;

use super::support::steps_scheduled_on;

pub struct DayEndReconciliationHandler {
    store: Arc<SwordStore>,
    kvs: Arc<dyn KeyValueStore>,
}

impl DayEndReconciliationHandler {
    pub fn new(store: Arc<SwordStore>, kvs: Arc<dyn KeyValueStore>) -> Self {
        Self { store, kvs }
    }

    async fn expire_sparks_for_step(&self, owner_user_id: &str, step_id: Uuid) -> Result<(), String> {
        for spark_id in self.store.user_spark_ids(owner_user_id).await.into_iter().filter_map(|id| Uuid::parse_str(&id).ok()) {
            let Some(spark) = self.store.load_spark(spark_id).await.map_err(|error| error.to_string())? else { continue };
            if spark.step_id != step_id || matches!(spark.status, SparkStatus::Completed | SparkStatus::Skipped | SparkStatus::Expired) {
                continue;
            }
            let (updated, _effects) = apply_spark_event(&spark, SparkEvent::Expire).map_err(|error| error.to_string())?;
            self.store.save_spark(&updated).await.map_err(|error| error.to_string())?;
        }
        Ok(())
    }
}

#[async_trait]
impl JobHandler for DayEndReconciliationHandler {
    async fn run(&self, ctx: &JobRunContext) -> Result<(), String> {
        let today = ctx.scheduled_for.date_naive();
        let scheduled = steps_scheduled_on(&self.store, today).await;

        // (owner, goal) -> did any of today's steps end up missed/skipped.
        let mut streak_groups: HashMap<(String, Uuid), bool> = HashMap::new();
        let mut missed = 0u32;

        for item in scheduled {
            let step = item.step;
            let group_key = (step.owner_user_id.clone(), item.goal_id);

            let final_status = if matches!(step.status, StepStatus::Pending | StepStatus::Active) {
                self.store.apply_step_transition(step.id, StepEvent::Miss).await.map_err(|error| error.to_string())?;
                self.expire_sparks_for_step(&step.owner_user_id, step.id).await?;
                missed += 1;
                StepStatus::Missed
            } else {
                step.status
            };

            let any_missed = matches!(final_status, StepStatus::Missed | StepStatus::Skipped);
            let entry = streak_groups.entry(group_key).or_insert(false);
            *entry = *entry || any_missed;
        }

        for ((owner_user_id, goal_id), broken) in streak_groups {
            let key = format!("sword:streak:{owner_user_id}:{goal_id}");
            if broken {
                // `incr_by` treats an absent key as 0, so deleting it is the
                // same reset without needing to know the prior count.
                self.kvs.delete(&key).await;
            } else {
                self.kvs.incr_by(&key, 1).await;
            }
        }

        tracing::info!(tick = %ctx.tick, missed, "day-end reconciliation complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use novaos_models::{Goal, GoalStatus, Quest, QuestStatus, Spark, SparkStatus, Step};

    fn context(scheduled_for: chrono::DateTime<Utc>) -> JobRunContext {
        JobRunContext { job_id: novaos_models::JobId::DayEndReconciliation, tick: scheduled_for.to_rfc3339(), scheduled_for, attempt: 1 }
    }

    struct Fixture {
        store: Arc<SwordStore>,
        kvs: Arc<dyn KeyValueStore>,
        goal: Goal,
    }

    async fn seed(now: chrono::DateTime<Utc>, step_status: StepStatus) -> (Fixture, Step) {
        let kvs: Arc<dyn KeyValueStore> = Arc::new(novaos_kvs::MemoryStore::new());
        let store = Arc::new(SwordStore::new(kvs.clone()));

        let goal = Goal {
            id: Uuid::new_v4(),
            owner_user_id: "u1".to_string(),
            status: GoalStatus::Active,
            title: "run a marathon".to_string(),
            quest_ids: vec![],
            progress: 0.0,
            created_at: now,
            updated_at: now,
        };
        let quest = Quest {
            id: Uuid::new_v4(),
            goal_id: goal.id,
            owner_user_id: "u1".to_string(),
            status: QuestStatus::Active,
            title: "build base mileage".to_string(),
            step_ids: vec![],
            progress: 0.0,
            created_at: now,
            updated_at: now,
        };
        let step = Step {
            id: Uuid::new_v4(),
            quest_id: quest.id,
            owner_user_id: "u1".to_string(),
            status: step_status,
            title: "run 5k".to_string(),
            scheduled_date: now.date_naive(),
            created_at: now,
            updated_at: now,
        };
        store.save_goal(&goal).await.unwrap();
        store.save_quest(&quest).await.unwrap();
        store.save_step(&step).await.unwrap();

        (Fixture { store, kvs, goal }, step)
    }

    #[tokio::test]
    async fn marks_pending_step_missed_and_breaks_streak() {
        let now = Utc::now();
        let (fixture, step) = seed(now, StepStatus::Pending).await;
        fixture.kvs.incr_by(&format!("sword:streak:u1:{}", fixture.goal.id), 5).await;

        let handler = DayEndReconciliationHandler::new(fixture.store.clone(), fixture.kvs.clone());
        handler.run(&context(now)).await.unwrap();

        let step_after = fixture.store.load_step(step.id).await.unwrap().unwrap();
        assert_eq!(step_after.status, StepStatus::Missed);

        // A broken streak resets: the next increment starts counting from 0 again.
        let streak_key = format!("sword:streak:u1:{}", fixture.goal.id);
        assert!(fixture.kvs.get(&streak_key).await.is_none());
        assert_eq!(fixture.kvs.incr_by(&streak_key, 1).await, 1);
    }

    #[tokio::test]
    async fn completed_step_leaves_streak_incremented() {
        let now = Utc::now();
        let (fixture, _step) = seed(now, StepStatus::Completed).await;

        let handler = DayEndReconciliationHandler::new(fixture.store.clone(), fixture.kvs.clone());
        handler.run(&context(now)).await.unwrap();

        // incr_by returning 1 confirms the key now holds exactly one tick of streak.
        assert_eq!(fixture.kvs.incr_by(&format!("sword:streak:u1:{}", fixture.goal.id), 0).await, 1);
    }

    #[tokio::test]
    async fn expires_active_spark_on_missed_step() {
        let now = Utc::now();
        let (fixture, step) = seed(now, StepStatus::Pending).await;

        let spark = Spark {
            id: Uuid::new_v4(),
            step_id: step.id,
            owner_user_id: "u1".to_string(),
            status: SparkStatus::Suggested,
            escalation_level: 0,
            title: "run 5k".to_string(),
            created_at: now,
            expires_at: now + chrono::Duration::hours(24),
            updated_at: now,
        };
        fixture.store.save_spark(&spark).await.unwrap();

        let handler = DayEndReconciliationHandler::new(fixture.store.clone(), fixture.kvs.clone());
        handler.run(&context(now)).await.unwrap();

        let spark_after = fixture.store.load_spark(spark.id).await.unwrap().unwrap();
        assert_eq!(spark_after.status, SparkStatus::Expired);
    }
}
