// [libs/domain/reminders/src/notification.rs]
//! The `reminder_escalation` job body (spec S4.10): re-reads every active
//! spark, bumps any whose age has crossed a new escalation threshold, and
//! enqueues a notification for the owner. Idempotent over repeat runs at
//! the same tick — a spark already at its target level is left untouched
//! and nothing is re-enqueued for it, satisfying the handler's
//! idempotence requirement without a separate dedup ledger.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use novaos_kvs::KeyValueStore;
use novaos_models::{Spark, SparkStatus};
use serde::Serialize;
use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

use crate::escalation::target_escalation_level;

#[derive(Debug, Error)]
pub enum EscalationError {
    #[error("failed to update escalation level for spark {0}: {1}")]
    StoreUpdate(Uuid, String),
}

/// The seam `sword`'s persistence layer plugs into. Defined here rather
/// than pulled in as a dependency on the (not yet built at the time of
/// writing) sword store, the same decoupling already used between
/// `ssrf-guard` and rate limiting: this crate states what it needs from
/// spark storage, the storage crate implements it.
#[async_trait]
pub trait SparkEscalationStore: Send + Sync {
    /// Sparks not yet in a terminal status (`completed`, `skipped`,
    /// `expired`) — the population `reminder_escalation` sweeps.
    async fn active_sparks(&self) -> Vec<Spark>;

    async fn set_escalation_level(&self, spark_id: Uuid, level: u8) -> Result<(), String>;
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderNotification {
    pub spark_id: Uuid,
    pub owner_user_id: String,
    pub escalation_level: u8,
    pub title: String,
    pub enqueued_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EscalationRunSummary {
    pub considered: usize,
    pub escalated: usize,
}

pub struct ReminderEscalationJob {
    store: Arc<dyn SparkEscalationStore>,
    kvs: Arc<dyn KeyValueStore>,
}

impl ReminderEscalationJob {
    pub fn new(store: Arc<dyn SparkEscalationStore>, kvs: Arc<dyn KeyValueStore>) -> Self {
        Self { store, kvs }
    }

    #[instrument(skip(self))]
    pub async fn run(&self, now: DateTime<Utc>) -> Result<EscalationRunSummary, EscalationError> {
        let sparks = self.store.active_sparks().await;
        let mut summary = EscalationRunSummary { considered: sparks.len(), escalated: 0 };

        for spark in sparks {
            debug_assert!(!matches!(spark.status, SparkStatus::Completed | SparkStatus::Skipped | SparkStatus::Expired));

            let target = target_escalation_level(spark.created_at, now);
            if target <= spark.escalation_level {
                continue;
            }

            self.store
                .set_escalation_level(spark.id, target)
                .await
                .map_err(|reason| EscalationError::StoreUpdate(spark.id, reason))?;

            let notification = ReminderNotification {
                spark_id: spark.id,
                owner_user_id: spark.owner_user_id.clone(),
                escalation_level: target,
                title: spark.title.clone(),
                enqueued_at: now,
            };
            let queue_key = format!("notifications:queue:{}", spark.owner_user_id);
            let payload = serde_json::to_vec(&notification).expect("ReminderNotification always serializes");
            self.kvs.lpush(&queue_key, payload).await;

            summary.escalated += 1;
            tracing::info!(spark_id = %spark.id, level = target, "spark escalated");
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use novaos_kvs::MemoryStore;
    use std::sync::Mutex;

    struct FakeSparkStore {
        sparks: Mutex<Vec<Spark>>,
    }

    fn spark(id: Uuid, owner: &str, status: SparkStatus, age_hours: i64, escalation_level: u8) -> Spark {
        let created_at = Utc::now() - Duration::hours(age_hours);
        Spark {
            id,
            step_id: Uuid::new_v4(),
            owner_user_id: owner.to_string(),
            status,
            escalation_level,
            title: "morning walk".to_string(),
            created_at,
            expires_at: created_at + Duration::hours(24),
            updated_at: created_at,
        }
    }

    #[async_trait]
    impl SparkEscalationStore for FakeSparkStore {
        async fn active_sparks(&self) -> Vec<Spark> {
            self.sparks.lock().unwrap().clone()
        }

        async fn set_escalation_level(&self, spark_id: Uuid, level: u8) -> Result<(), String> {
            let mut sparks = self.sparks.lock().unwrap();
            let spark = sparks.iter_mut().find(|s| s.id == spark_id).ok_or_else(|| "spark not found".to_string())?;
            spark.escalation_level = level;
            Ok(())
        }
    }

    #[tokio::test]
    async fn stale_spark_is_escalated_and_enqueued() {
        let id = Uuid::new_v4();
        let store: Arc<dyn SparkEscalationStore> =
            Arc::new(FakeSparkStore { sparks: Mutex::new(vec![spark(id, "user-1", SparkStatus::Accepted, 4, 0)]) });
        let kvs: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let job = ReminderEscalationJob::new(store, kvs.clone());

        let summary = job.run(Utc::now()).await.unwrap();
        assert_eq!(summary, EscalationRunSummary { considered: 1, escalated: 1 });

        let queued = kvs.rpop("notifications:queue:user-1").await.unwrap();
        let notification: ReminderNotification = serde_json::from_slice(&queued).unwrap();
        assert_eq!(notification.escalation_level, 1);
        assert_eq!(notification.spark_id, id);
    }

    #[tokio::test]
    async fn spark_already_at_target_level_is_left_alone() {
        let id = Uuid::new_v4();
        let store: Arc<dyn SparkEscalationStore> =
            Arc::new(FakeSparkStore { sparks: Mutex::new(vec![spark(id, "user-1", SparkStatus::Accepted, 4, 1)]) });
        let kvs: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let job = ReminderEscalationJob::new(store, kvs.clone());

        let summary = job.run(Utc::now()).await.unwrap();
        assert_eq!(summary, EscalationRunSummary { considered: 1, escalated: 0 });
        assert!(kvs.rpop("notifications:queue:user-1").await.is_none());
    }

    #[tokio::test]
    async fn repeat_run_at_same_tick_is_idempotent() {
        let id = Uuid::new_v4();
        let store: Arc<dyn SparkEscalationStore> =
            Arc::new(FakeSparkStore { sparks: Mutex::new(vec![spark(id, "user-1", SparkStatus::Accepted, 4, 0)]) });
        let kvs: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let job = ReminderEscalationJob::new(store, kvs.clone());

        let now = Utc::now();
        let first = job.run(now).await.unwrap();
        let second = job.run(now).await.unwrap();
        assert_eq!(first.escalated, 1);
        assert_eq!(second.escalated, 0);
    }
}
