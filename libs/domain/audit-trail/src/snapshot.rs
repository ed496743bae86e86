// [libs/domain/audit-trail/src/snapshot.rs]
//! Snapshot assembly and envelope-encrypted storage (spec S4.11 step 3).
//! `AuditSnapshot` holds the redacted text, never the original — by the
//! time one of these exists in memory, the unredacted message is gone.

use chrono::{DateTime, Utc};
use novaos_crypto_engine::{EnvelopeEncryption, EnvelopeError};
use novaos_kvs::KeyValueStore;
use novaos_models::ResponseAudit;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Snapshots are retained for audit review; this is the default TTL when
/// no category-specific retention policy overrides it (see `retention_enforcement`).
const DEFAULT_SNAPSHOT_TTL: Duration = Duration::from_secs(90 * 24 * 60 * 60);

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditSnapshot {
    pub input_redacted: String,
    pub output_redacted: String,
    pub constraints: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to serialize snapshot: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("envelope encryption failed: {0}")]
    Envelope(#[from] EnvelopeError),
}

pub struct SnapshotStore {
    encryption: EnvelopeEncryption,
    kvs: Arc<dyn KeyValueStore>,
}

impl SnapshotStore {
    pub fn new(encryption: EnvelopeEncryption, kvs: Arc<dyn KeyValueStore>) -> Self {
        Self { encryption, kvs }
    }

    /// Serializes, envelope-encrypts, and stores `snapshot` under a
    /// reference keyed by `request_id`. Returns `(snapshot_ref, key_version)`
    /// for embedding into the `ResponseAudit` record.
    pub async fn store(&self, request_id: &str, snapshot: &AuditSnapshot) -> Result<(String, u32), SnapshotError> {
        let plaintext = serde_json::to_vec(snapshot)?;
        let envelope = self.encryption.encrypt(&plaintext)?;
        let snapshot_ref = format!("audit:snapshot:{request_id}");
        let serialized_envelope = serde_json::to_vec(&envelope)?;
        self.kvs.set_with_ttl(&snapshot_ref, serialized_envelope, Some(DEFAULT_SNAPSHOT_TTL)).await;
        Ok((snapshot_ref, envelope.version))
    }

    /// Writes the plain (unencrypted — it carries hashes and gate trace,
    /// never raw message text) `ResponseAudit` record under `audit:response:
    /// {requestId}` (spec S4.11 step 4, S6 persisted-state layout).
    pub async fn store_response(&self, audit: &ResponseAudit) -> Result<(), SnapshotError> {
        let key = format!("audit:response:{}", audit.request_id);
        let bytes = serde_json::to_vec(audit)?;
        self.kvs.set_with_ttl(&key, bytes, Some(DEFAULT_SNAPSHOT_TTL)).await;
        Ok(())
    }

    pub async fn load(&self, snapshot_ref: &str) -> Result<Option<AuditSnapshot>, SnapshotError> {
        let Some(raw) = self.kvs.get(snapshot_ref).await else {
            return Ok(None);
        };
        let envelope = serde_json::from_slice(&raw)?;
        let plaintext = self.encryption.decrypt(&envelope)?;
        let snapshot = serde_json::from_slice(&plaintext)?;
        Ok(Some(snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use novaos_crypto_engine::KeyRing;
    use novaos_kvs::MemoryStore;

    fn store() -> SnapshotStore {
        let encryption = EnvelopeEncryption::new(KeyRing::new(1, [9u8; 32]));
        let kvs: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        SnapshotStore::new(encryption, kvs)
    }

    #[tokio::test]
    async fn stores_and_loads_round_trip() {
        let store = store();
        let snapshot = AuditSnapshot {
            input_redacted: "hi [REDACTED:email]".to_string(),
            output_redacted: "sure, here's help".to_string(),
            constraints: vec!["quote_evidence_only".to_string()],
            timestamp: Utc::now(),
        };
        let (snapshot_ref, version) = store.store("req-1", &snapshot).await.unwrap();
        assert_eq!(version, 1);
        let loaded = store.load(&snapshot_ref).await.unwrap().unwrap();
        assert_eq!(loaded.input_redacted, snapshot.input_redacted);
    }

    #[tokio::test]
    async fn response_record_is_retrievable_under_its_own_key() {
        use novaos_models::{GateId, Stance};

        let store = store();
        let audit = ResponseAudit {
            request_id: "req-9".to_string(),
            user_id: "user-1".to_string(),
            timestamp: Utc::now(),
            policy_versions: Default::default(),
            input_hash: "a".repeat(64),
            output_hash: "b".repeat(64),
            snapshot_ref: "audit:snapshot:req-9".to_string(),
            snapshot_key_version: 1,
            redaction_applied: false,
            redacted_patterns: vec![],
            gates_executed: vec![GateId::Intent],
            stance: Stance::Lens,
            model: Some("primary".to_string()),
            intervention_applied: None,
            ack_override_applied: false,
            response_generated: true,
            regeneration_count: 0,
            stopped_at: None,
            stopped_reason: None,
            trust_violations: vec![],
            linguistic_violations: vec![],
        };

        store.store_response(&audit).await.unwrap();
        let raw = store.kvs.get("audit:response:req-9").await.unwrap();
        let reloaded: ResponseAudit = serde_json::from_slice(&raw).unwrap();
        assert_eq!(reloaded.request_id, "req-9");
    }

    #[tokio::test]
    async fn missing_snapshot_ref_returns_none() {
        let store = store();
        let loaded = store.load("audit:snapshot:does-not-exist").await.unwrap();
        assert!(loaded.is_none());
    }
}
