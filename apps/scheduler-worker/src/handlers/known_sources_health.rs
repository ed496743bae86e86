// [apps/scheduler-worker/src/handlers/known_sources_health.rs]
//! `known_sources_health` (spec S4.10): weekly sweep over `lens:source:*`.
//! Per-call failure/recovery already moves a source between
//! `active|degraded|failed` (see `secure-transport::source_health`); this job
//! owns the coarser edge that per-call bookkeeping never reaches on its own —
//! escalating a source stuck at `failed` to `disabled`, and releasing a
//! `disabled` source back to `active` once it has sat out 7 days.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use novaos_kvs::KeyValueStore;
use novaos_models::{SourceHealth, SourceStatus};
use novaos_scheduler_runtime::{JobHandler, JobRunContext};

const DISABLED_COOLDOWN_DAYS: i64 = 7;

pub struct KnownSourcesHealthHandler {
    kvs: Arc<dyn KeyValueStore>,
}

impl KnownSourcesHealthHandler {
    pub fn new(kvs: Arc<dyn KeyValueStore>) -> Self {
        Self { kvs }
    }
}

#[async_trait]
impl JobHandler for KnownSourcesHealthHandler {
    async fn run(&self, ctx: &JobRunContext) -> Result<(), String> {
        let now = ctx.scheduled_for;
        let mut disabled = 0u32;
        let mut reenabled = 0u32;

        for key in self.kvs.scan_by_pattern("lens:source:*").await {
            let Some(bytes) = self.kvs.get(&key).await else { continue };
            let Ok(mut health) = serde_json::from_slice::<SourceHealth>(&bytes) else {
                tracing::debug!(key, "lens:source entry not parseable, skipping");
                continue;
            };

            match health.status {
                SourceStatus::Failed => {
                    health.status = SourceStatus::Disabled;
                    health.disabled_at = Some(now);
                    disabled += 1;
                }
                SourceStatus::Disabled => {
                    let stale_since = health.disabled_at.unwrap_or(health.updated_at);
                    if now - stale_since >= Duration::days(DISABLED_COOLDOWN_DAYS) {
                        health.status = SourceStatus::Active;
                        health.consecutive_failures = 0;
                        health.disabled_at = None;
                        reenabled += 1;
                    } else {
                        continue;
                    }
                }
                SourceStatus::Active | SourceStatus::Degraded => continue,
            }

            health.updated_at = now;
            let updated = serde_json::to_vec(&health).map_err(|error| error.to_string())?;
            self.kvs.set_with_ttl(&key, updated, None).await;
        }

        tracing::info!(tick = %ctx.tick, disabled, reenabled, "known sources health swept");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn context(scheduled_for: chrono::DateTime<Utc>) -> JobRunContext {
        JobRunContext { job_id: novaos_models::JobId::KnownSourcesHealth, tick: scheduled_for.to_rfc3339(), scheduled_for, attempt: 1 }
    }

    async fn write_health(kvs: &Arc<dyn KeyValueStore>, id: &str, health: &SourceHealth) {
        let bytes = serde_json::to_vec(health).unwrap();
        kvs.set_with_ttl(&format!("lens:source:{id}"), bytes, None).await;
    }

    #[tokio::test]
    async fn failed_source_is_disabled() {
        let kvs: Arc<dyn KeyValueStore> = Arc::new(novaos_kvs::MemoryStore::new());
        let now = Utc::now();
        write_health(&kvs, "stock", &SourceHealth { status: SourceStatus::Failed, ..SourceHealth::new("stock") }).await;

        let handler = KnownSourcesHealthHandler::new(kvs.clone());
        handler.run(&context(now)).await.unwrap();

        let bytes = kvs.get("lens:source:stock").await.unwrap();
        let health: SourceHealth = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(health.status, SourceStatus::Disabled);
        assert_eq!(health.disabled_at, Some(now));
    }

    #[tokio::test]
    async fn disabled_source_re_enables_after_cooldown() {
        let kvs: Arc<dyn KeyValueStore> = Arc::new(novaos_kvs::MemoryStore::new());
        let disabled_at = Utc::now() - Duration::days(8);
        write_health(
            &kvs,
            "weather",
            &SourceHealth { status: SourceStatus::Disabled, disabled_at: Some(disabled_at), consecutive_failures: 5, ..SourceHealth::new("weather") },
        )
        .await;

        let handler = KnownSourcesHealthHandler::new(kvs.clone());
        handler.run(&context(Utc::now())).await.unwrap();

        let bytes = kvs.get("lens:source:weather").await.unwrap();
        let health: SourceHealth = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(health.status, SourceStatus::Active);
        assert_eq!(health.consecutive_failures, 0);
        assert!(health.disabled_at.is_none());
    }

    #[tokio::test]
    async fn disabled_source_within_cooldown_stays_disabled() {
        let kvs: Arc<dyn KeyValueStore> = Arc::new(novaos_kvs::MemoryStore::new());
        let disabled_at = Utc::now() - Duration::days(2);
        write_health(&kvs, "fx", &SourceHealth { status: SourceStatus::Disabled, disabled_at: Some(disabled_at), ..SourceHealth::new("fx") }).await;

        let handler = KnownSourcesHealthHandler::new(kvs.clone());
        handler.run(&context(Utc::now())).await.unwrap();

        let bytes = kvs.get("lens:source:fx").await.unwrap();
        let health: SourceHealth = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(health.status, SourceStatus::Disabled);
    }
}
