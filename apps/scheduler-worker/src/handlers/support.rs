// [apps/scheduler-worker/src/handlers/support.rs]
//! Enumeration shared by `morning_sparks` and `day_end_reconciliation`:
//! every step scheduled on a given date, across every user with an active
//! goal and active quest. Neither handler owns this walk outright since
//! both need the same population.

use chrono::NaiveDate;
use novaos_models::{GoalStatus, QuestStatus, Step};
use novaos_sword::SwordStore;
use uuid::Uuid;

pub struct ScheduledStep {
    pub step: Step,
    pub goal_id: Uuid,
}

/// Walks `all_user_ids -> active goals -> active quests -> steps indexed
/// under `date`. Every layer is a KVS set lookup (`sword` crate's indices),
/// never a full scan — the only scan in this walk is `all_user_ids` itself,
/// already documented as acceptable at scheduler-tick frequency.
pub async fn steps_scheduled_on(store: &SwordStore, date: NaiveDate) -> Vec<ScheduledStep> {
    let mut scheduled = Vec::new();

    for user_id in store.all_user_ids().await {
        for goal_id in parse_uuids(store.user_goal_ids(&user_id).await) {
            let Ok(Some(goal)) = store.load_goal(goal_id).await else { continue };
            if goal.status != GoalStatus::Active {
                continue;
            }

            for quest_id in parse_uuids(store.goal_quest_ids(goal_id).await) {
                let Ok(Some(quest)) = store.load_quest(quest_id).await else { continue };
                if quest.status != QuestStatus::Active {
                    continue;
                }

                for step_id in parse_uuids(store.step_ids_for_quest_on(quest_id, date).await) {
                    if let Ok(Some(step)) = store.load_step(step_id).await {
                        scheduled.push(ScheduledStep { step, goal_id });
                    }
                }
            }
        }
    }

    scheduled
}

fn parse_uuids(raw: Vec<String>) -> Vec<Uuid> {
    raw.into_iter().filter_map(|id| Uuid::parse_str(&id).ok()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use novaos_kvs::KeyValueStore;
    use novaos_models::{Goal, GoalStatus, Quest, QuestStatus, StepStatus};
    use std::sync::Arc;

    #[tokio::test]
    async fn finds_step_through_active_goal_and_quest() {
        let kvs: Arc<dyn KeyValueStore> = Arc::new(novaos_kvs::MemoryStore::new());
        let store = SwordStore::new(kvs);
        let now = Utc::now();
        let today = now.date_naive();

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
            status: StepStatus::Pending,
            title: "run 5k".to_string(),
            scheduled_date: today,
            created_at: now,
            updated_at: now,
        };
        store.save_goal(&goal).await.unwrap();
        store.save_quest(&quest).await.unwrap();
        store.save_step(&step).await.unwrap();

        let found = steps_scheduled_on(&store, today).await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].step.id, step.id);
        assert_eq!(found[0].goal_id, goal.id);
    }

    #[tokio::test]
    async fn skips_steps_under_a_paused_goal() {
        let kvs: Arc<dyn KeyValueStore> = Arc::new(novaos_kvs::MemoryStore::new());
        let store = SwordStore::new(kvs);
        let now = Utc::now();
        let today = now.date_naive();

        let goal = Goal {
            id: Uuid::new_v4(),
            owner_user_id: "u1".to_string(),
            status: GoalStatus::Paused,
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
            status: StepStatus::Pending,
            title: "run 5k".to_string(),
            scheduled_date: today,
            created_at: now,
            updated_at: now,
        };
        store.save_goal(&goal).await.unwrap();
        store.save_quest(&quest).await.unwrap();
        store.save_step(&step).await.unwrap();

        assert!(steps_scheduled_on(&store, today).await.is_empty());
    }
}
