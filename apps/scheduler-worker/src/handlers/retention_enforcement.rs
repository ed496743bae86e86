// [apps/scheduler-worker/src/handlers/retention_enforcement.rs]
//! `retention_enforcement` (spec S4.10, S6 "retention (days per category)"):
//! daily sweep enforcing `NovaConfig::retention`'s policies. Every entry this
//! codebase writes is a camelCase JSON object (serde's workspace-wide
//! convention), so age is read off whichever of `updatedAt`/`createdAt`/
//! `timestamp` the value happens to carry — there is no single KVS primitive
//! for "get with recorded timestamp", so this handler has to look inside the
//! payload itself.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use novaos_kvs::KeyValueStore;
use novaos_scheduler_runtime::{JobHandler, JobRunContext};
use novaos_secrets_vault::ConfigHandle;

pub struct RetentionEnforcementHandler {
    config: ConfigHandle,
    kvs: Arc<dyn KeyValueStore>,
}

impl RetentionEnforcementHandler {
    pub fn new(config: ConfigHandle, kvs: Arc<dyn KeyValueStore>) -> Self {
        Self { config, kvs }
    }
}

#[async_trait]
impl JobHandler for RetentionEnforcementHandler {
    async fn run(&self, ctx: &JobRunContext) -> Result<(), String> {
        let now = ctx.scheduled_for;
        let config = self.config.current();
        let mut archived = 0u32;
        let mut deleted = 0u32;

        for policy in &config.retention.policies {
            for key in self.kvs.scan_by_pattern(&policy.pattern).await {
                let Some(bytes) = self.kvs.get(&key).await else { continue };
                let Some(recorded_at) = extract_timestamp(&bytes) else {
                    tracing::debug!(key, pattern = %policy.pattern, "no recoverable timestamp, leaving entry");
                    continue;
                };

                if now - recorded_at < Duration::days(policy.retention_days as i64) {
                    continue;
                }

                if policy.archive {
                    self.kvs.set_with_ttl(&format!("archive:{key}"), bytes, None).await;
                    archived += 1;
                }
                self.kvs.delete(&key).await;
                deleted += 1;
            }
        }

        tracing::info!(tick = %ctx.tick, archived, deleted, "retention enforcement swept");
        Ok(())
    }
}

fn extract_timestamp(bytes: &[u8]) -> Option<DateTime<Utc>> {
    let value: serde_json::Value = serde_json::from_slice(bytes).ok()?;
    for field in ["updatedAt", "createdAt", "timestamp"] {
        if let Some(raw) = value.get(field).and_then(|v| v.as_str()) {
            if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
                return Some(parsed.with_timezone(&Utc));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use novaos_secrets_vault::{GateTimeouts, NovaConfig, RateLimitConfig, RetentionPolicy, SsrfConfig};

    fn context(scheduled_for: DateTime<Utc>) -> JobRunContext {
        JobRunContext { job_id: novaos_models::JobId::RetentionEnforcement, tick: scheduled_for.to_rfc3339(), scheduled_for, attempt: 1 }
    }

    fn config_with(policies: Vec<RetentionPolicy>) -> ConfigHandle {
        ConfigHandle::from_config(NovaConfig {
            service_name: "test".to_string(),
            is_production: false,
            gate_timeouts: GateTimeouts::default(),
            max_regeneration_attempts: 2,
            ack_token_secrets: vec![b"secret".to_vec()],
            audit_encryption_keys: vec![(1, b"key".to_vec())],
            rate_limit: RateLimitConfig::default(),
            ssrf: SsrfConfig::default(),
            llm_provider_chain: vec![],
            retention: novaos_secrets_vault::RetentionConfig { policies },
        })
    }

    #[tokio::test]
    async fn deletes_entries_past_retention() {
        let kvs: Arc<dyn KeyValueStore> = Arc::new(novaos_kvs::MemoryStore::new());
        let now = Utc::now();
        let stale = now - Duration::days(10);
        kvs.set_with_ttl("sword:spark:old", serde_json::json!({"updatedAt": stale.to_rfc3339()}).to_string().into_bytes(), None).await;

        let config = config_with(vec![RetentionPolicy { pattern: "sword:spark:*".to_string(), retention_days: 7, archive: false }]);
        let handler = RetentionEnforcementHandler::new(config, kvs.clone());
        handler.run(&context(now)).await.unwrap();

        assert!(kvs.get("sword:spark:old").await.is_none());
    }

    #[tokio::test]
    async fn archives_before_deleting_when_policy_requests_it() {
        let kvs: Arc<dyn KeyValueStore> = Arc::new(novaos_kvs::MemoryStore::new());
        let now = Utc::now();
        let stale = now - Duration::days(100);
        kvs.set_with_ttl("audit:response:old", serde_json::json!({"createdAt": stale.to_rfc3339()}).to_string().into_bytes(), None).await;

        let config = config_with(vec![RetentionPolicy { pattern: "audit:response:*".to_string(), retention_days: 90, archive: true }]);
        let handler = RetentionEnforcementHandler::new(config, kvs.clone());
        handler.run(&context(now)).await.unwrap();

        assert!(kvs.get("audit:response:old").await.is_none());
        assert!(kvs.get("archive:audit:response:old").await.is_some());
    }

    #[tokio::test]
    async fn leaves_entries_within_retention_window() {
        let kvs: Arc<dyn KeyValueStore> = Arc::new(novaos_kvs::MemoryStore::new());
        let now = Utc::now();
        let recent = now - Duration::days(1);
        kvs.set_with_ttl("sword:spark:fresh", serde_json::json!({"updatedAt": recent.to_rfc3339()}).to_string().into_bytes(), None).await;

        let config = config_with(vec![RetentionPolicy { pattern: "sword:spark:*".to_string(), retention_days: 7, archive: false }]);
        let handler = RetentionEnforcementHandler::new(config, kvs.clone());
        handler.run(&context(now)).await.unwrap();

        assert!(kvs.get("sword:spark:fresh").await.is_some());
    }

    #[tokio::test]
    async fn leaves_entries_with_no_recoverable_timestamp() {
        let kvs: Arc<dyn KeyValueStore> = Arc::new(novaos_kvs::MemoryStore::new());
        kvs.set_with_ttl("sword:spark:weird", b"not json".to_vec(), None).await;

        let config = config_with(vec![RetentionPolicy { pattern: "sword:spark:*".to_string(), retention_days: 7, archive: false }]);
        let handler = RetentionEnforcementHandler::new(config, kvs.clone());
        handler.run(&context(Utc::now())).await.unwrap();

        assert!(kvs.get("sword:spark:weird").await.is_some());
    }
}
