// [apps/scheduler-worker/src/handlers/generate_daily_steps.rs]
//! `generate_daily_steps` (spec S4.10): for each user with an active goal
//! and active quest, create tomorrow's step record if one isn't already
//! indexed. Idempotent by construction — the `sword:step:date:{date}:
//! {questId}` index is the only thing this handler consults to decide
//! "already created", so a retried tick never double-creates.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use novaos_models::{GoalStatus, QuestStatus, Step, StepStatus};
use novaos_scheduler_runtime::{JobHandler, JobRunContext};
use novaos_sword::SwordStore;
use uuid::Uuid;

pub struct GenerateDailyStepsHandler {
    store: Arc<SwordStore>,
}

impl GenerateDailyStepsHandler {
    pub fn new(store: Arc<SwordStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl JobHandler for GenerateDailyStepsHandler {
    async fn run(&self, ctx: &JobRunContext) -> Result<(), String> {
        let tomorrow = ctx.scheduled_for.date_naive() + Duration::days(1);
        let mut created = 0u32;

        for user_id in self.store.all_user_ids().await {
            for goal_id in parse_uuids(self.store.user_goal_ids(&user_id).await) {
                let goal = match self.store.load_goal(goal_id).await {
                    Ok(Some(goal)) if goal.status == GoalStatus::Active => goal,
                    Ok(_) => continue,
                    Err(error) => return Err(format!("load_goal {goal_id}: {error}")),
                };

                for quest_id in parse_uuids(self.store.goal_quest_ids(goal.id).await) {
                    let mut quest = match self.store.load_quest(quest_id).await {
                        Ok(Some(quest)) if quest.status == QuestStatus::Active => quest,
                        Ok(_) => continue,
                        Err(error) => return Err(format!("load_quest {quest_id}: {error}")),
                    };

                    if !self.store.step_ids_for_quest_on(quest.id, tomorrow).await.is_empty() {
                        continue;
                    }

                    let now = ctx.scheduled_for;
                    let step = Step {
                        id: Uuid::new_v4(),
                        quest_id: quest.id,
                        owner_user_id: quest.owner_user_id.clone(),
                        status: StepStatus::Pending,
                        title: quest.title.clone(),
                        scheduled_date: tomorrow,
                        created_at: now,
                        updated_at: now,
                    };

                    self.store.save_step(&step).await.map_err(|error| error.to_string())?;

                    // Progress recompute walks `quest.step_ids`, so a step
                    // absent from that list would never count toward — or
                    // block — the quest's auto-completion.
                    quest.step_ids.push(step.id);
                    self.store.save_quest(&quest).await.map_err(|error| error.to_string())?;
                    created += 1;
                }
            }
        }

        tracing::info!(tick = %ctx.tick, created, "daily steps generated");
        Ok(())
    }
}

fn parse_uuids(raw: Vec<String>) -> Vec<Uuid> {
    raw.into_iter().filter_map(|id| Uuid::parse_str(&id).ok()).collect()
}
