// [libs/infra/secure-transport/src/source_health.rs]
//! Keeps `lens:source:{id}`'s consecutive-failure counter current on every
//! transport call (spec S4.10 supplement). The coarser weekly flip between
//! `active|degraded|failed|disabled` is the scheduler's `known_sources_health`
//! job, not this module — this only accumulates the signal it reads.

use std::sync::Arc;

use chrono::Utc;
use novaos_kvs::KeyValueStore;
use novaos_models::{SourceHealth, SourceStatus};

const FAILURE_THRESHOLD: u32 = 3;

pub(crate) async fn record_outcome(kvs: &Arc<dyn KeyValueStore>, source_id: &str, success: bool) {
    let key = format!("lens:source:{source_id}");
    let mut health = match kvs.get(&key).await {
        Some(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|_| SourceHealth::new(source_id)),
        None => SourceHealth::new(source_id),
    };

    if success {
        health.consecutive_failures = 0;
        if health.status == SourceStatus::Degraded {
            health.status = SourceStatus::Active;
        }
    } else {
        health.consecutive_failures += 1;
        if health.status != SourceStatus::Disabled {
            health.status = if health.consecutive_failures >= FAILURE_THRESHOLD { SourceStatus::Failed } else { SourceStatus::Degraded };
        }
    }
    health.updated_at = Utc::now();

    if let Ok(bytes) = serde_json::to_vec(&health) {
        kvs.set_with_ttl(&key, bytes, None).await;
    }
}
