// [apps/scheduler-worker/src/handlers/morning_sparks.rs]
//! `morning_sparks` (spec S4.10): for each step scheduled today without an
//! active spark, create one expiring 24h out. Idempotent: a second run at
//! the same tick finds the spark it already created and skips (spec S8 S6).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use novaos_models::{Spark, SparkStatus, StepStatus};
use novaos_scheduler_runtime::{JobHandler, JobRunContext};
use novaos_sword::SwordStore;
use uuid::Uuid;

use super::support::steps_scheduled_on;

pub struct MorningSparksHandler {
    store: Arc<SwordStore>,
}

impl MorningSparksHandler {
    pub fn new(store: Arc<SwordStore>) -> Self {
        Self { store }
    }

    async fn has_active_spark(&self, owner_user_id: &str, step_id: Uuid) -> Result<bool, String> {
        for spark_id in self.store.user_spark_ids(owner_user_id).await.into_iter().filter_map(|id| Uuid::parse_str(&id).ok()) {
            let spark = self.store.load_spark(spark_id).await.map_err(|error| error.to_string())?;
            if let Some(spark) = spark {
                if spark.step_id == step_id && !matches!(spark.status, SparkStatus::Completed | SparkStatus::Skipped | SparkStatus::Expired) {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}

#[async_trait]
impl JobHandler for MorningSparksHandler {
    async fn run(&self, ctx: &JobRunContext) -> Result<(), String> {
        let today = ctx.scheduled_for.date_naive();
        let now = ctx.scheduled_for;
        let mut created = 0u32;

        for scheduled in steps_scheduled_on(&self.store, today).await {
            let step = scheduled.step;
            // A step already closed out (by user action earlier the same
            // day) has nothing left to spark.
            if matches!(step.status, StepStatus::Completed | StepStatus::Missed | StepStatus::Skipped) {
                continue;
            }

            if self.has_active_spark(&step.owner_user_id, step.id).await? {
                continue;
            }

            let spark = Spark {
                id: Uuid::new_v4(),
                step_id: step.id,
                owner_user_id: step.owner_user_id.clone(),
                status: SparkStatus::Suggested,
                escalation_level: 0,
                title: step.title.clone(),
                created_at: now,
                expires_at: now + Duration::hours(24),
                updated_at: now,
            };

            self.store.save_spark(&spark).await.map_err(|error| error.to_string())?;
            created += 1;
        }

        tracing::info!(tick = %ctx.tick, created, "morning sparks generated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use novaos_kvs::KeyValueStore;
    use novaos_models::{Goal, GoalStatus, Quest, QuestStatus};

    fn context(scheduled_for: chrono::DateTime<chrono::Utc>) -> JobRunContext {
        JobRunContext {
            job_id: novaos_models::JobId::MorningSparks,
            tick: scheduled_for.to_rfc3339(),
            scheduled_for,
            attempt: 1,
        }
    }

    async fn seeded_step(store: &SwordStore, now: chrono::DateTime<chrono::Utc>) -> novaos_models::Step {
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
        let step = novaos_models::Step {
            id: Uuid::new_v4(),
            quest_id: quest.id,
            owner_user_id: "u1".to_string(),
            status: StepStatus::Pending,
            title: "run 5k".to_string(),
            scheduled_date: now.date_naive(),
            created_at: now,
            updated_at: now,
        };
        store.save_goal(&goal).await.unwrap();
        store.save_quest(&quest).await.unwrap();
        store.save_step(&step).await.unwrap();
        step
    }

    #[tokio::test]
    async fn creates_spark_for_todays_unsparked_step() {
        let kvs: Arc<dyn KeyValueStore> = Arc::new(novaos_kvs::MemoryStore::new());
        let store = Arc::new(SwordStore::new(kvs));
        let now = chrono::Utc::now();
        let step = seeded_step(&store, now).await;

        let handler = MorningSparksHandler::new(store.clone());
        handler.run(&context(now)).await.unwrap();

        let spark_ids = store.user_spark_ids("u1").await;
        assert_eq!(spark_ids.len(), 1);
        let spark = store.load_spark(Uuid::parse_str(&spark_ids[0]).unwrap()).await.unwrap().unwrap();
        assert_eq!(spark.step_id, step.id);
        assert_eq!(spark.status, SparkStatus::Suggested);
    }

    #[tokio::test]
    async fn second_run_on_same_tick_does_not_duplicate_spark() {
        let kvs: Arc<dyn KeyValueStore> = Arc::new(novaos_kvs::MemoryStore::new());
        let store = Arc::new(SwordStore::new(kvs));
        let now = chrono::Utc::now();
        seeded_step(&store, now).await;

        let handler = MorningSparksHandler::new(store.clone());
        handler.run(&context(now)).await.unwrap();
        handler.run(&context(now)).await.unwrap();

        assert_eq!(store.user_spark_ids("u1").await.len(), 1);
    }
}
