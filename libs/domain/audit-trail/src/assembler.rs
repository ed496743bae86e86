// [libs/domain/audit-trail/src/assembler.rs]
//! Per-request audit sequence (spec S4.11): hash, redact, snapshot, seal.
//! This is the one place all four steps are wired together; callers never
//! assemble a `ResponseAudit` by hand.

use chrono::Utc;
use novaos_crypto_engine::sha256_hex;
use novaos_models::{GateId, PipelineState, PolicyVersions, ResponseAudit, Stance};
use thiserror::Error;

use crate::redaction::redact;
use crate::snapshot::{AuditSnapshot, SnapshotError, SnapshotStore};

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("failed to persist audit snapshot: {0}")]
    Snapshot(#[from] SnapshotError),
}

/// Everything the assembler needs beyond the pipeline state itself — the
/// fields a `GateHandler` never sees because they belong to the orchestrator
/// and the response, not to any single gate.
pub struct AuditInput<'a> {
    pub state: &'a PipelineState,
    pub response_text: &'a str,
    pub policy_versions: PolicyVersions,
    pub gates_executed: Vec<GateId>,
    pub model: Option<String>,
    pub intervention_applied: Option<String>,
    pub trust_violations: Vec<String>,
    pub linguistic_violations: Vec<String>,
    pub constraints: Vec<String>,
}

pub struct AuditAssembler {
    snapshot_store: SnapshotStore,
}

impl AuditAssembler {
    pub fn new(snapshot_store: SnapshotStore) -> Self {
        Self { snapshot_store }
    }

    pub async fn assemble(&self, input: AuditInput<'_>) -> Result<ResponseAudit, AuditError> {
        let input_hash = sha256_hex(&input.state.user_message);
        let output_hash = sha256_hex(input.response_text);

        let input_redaction = redact(&input.state.user_message);
        let output_redaction = redact(input.response_text);

        let mut redacted_patterns = input_redaction.patterns_matched.clone();
        redacted_patterns.extend(output_redaction.patterns_matched.iter().cloned());
        redacted_patterns.sort();
        redacted_patterns.dedup();
        let redaction_applied = !redacted_patterns.is_empty();

        let snapshot = AuditSnapshot {
            input_redacted: input_redaction.redacted_text,
            output_redacted: output_redaction.redacted_text,
            constraints: input.constraints,
            timestamp: Utc::now(),
        };
        let (snapshot_ref, snapshot_key_version) = self.snapshot_store.store(&input.state.request_id, &snapshot).await?;

        let audit = ResponseAudit {
            request_id: input.state.request_id.clone(),
            user_id: input.state.user_id.clone(),
            timestamp: Utc::now(),
            policy_versions: input.policy_versions,
            input_hash,
            output_hash,
            snapshot_ref,
            snapshot_key_version,
            redaction_applied,
            redacted_patterns,
            gates_executed: input.gates_executed,
            stance: input.state.stance,
            model: input.model,
            intervention_applied: input.intervention_applied,
            ack_override_applied: input.state.ack_token_valid.unwrap_or(false),
            response_generated: input.state.generation.is_some(),
            regeneration_count: input.state.regeneration_count,
            stopped_at: input.state.stopped_at,
            stopped_reason: input.state.stopped_reason.clone(),
            trust_violations: input.trust_violations,
            linguistic_violations: input.linguistic_violations,
        };

        self.snapshot_store.store_response(&audit).await?;
        Ok(audit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use novaos_crypto_engine::{EnvelopeEncryption, KeyRing};
    use novaos_kvs::{KeyValueStore, MemoryStore};
    use std::sync::Arc;

    fn assembler() -> AuditAssembler {
        let encryption = EnvelopeEncryption::new(KeyRing::new(1, [3u8; 32]));
        let kvs: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        AuditAssembler::new(SnapshotStore::new(encryption, kvs))
    }

    #[tokio::test]
    async fn assembles_record_with_full_hex_hashes_and_no_raw_pii() {
        let state = PipelineState::new("req-1".into(), "user-1".into(), "my ssn is 123-45-6789".into(), "my ssn is 123-45-6789".into());
        let assembler = assembler();
        let audit = assembler
            .assemble(AuditInput {
                state: &state,
                response_text: "I can't help verify that directly.",
                policy_versions: PolicyVersions::default(),
                gates_executed: vec![GateId::Intent, GateId::Shield],
                model: Some("primary".to_string()),
                intervention_applied: None,
                trust_violations: vec![],
                linguistic_violations: vec![],
                constraints: vec![],
            })
            .await
            .unwrap();

        assert_eq!(audit.input_hash.len(), 64);
        assert_eq!(audit.output_hash.len(), 64);
        assert!(audit.redaction_applied);
        assert_eq!(audit.redacted_patterns, vec!["ssn".to_string()]);
        assert_eq!(audit.stance, Stance::Lens);
    }

    #[tokio::test]
    async fn clean_exchange_reports_no_redaction() {
        let state = PipelineState::new("req-2".into(), "user-1".into(), "what's a good banana bread recipe?".into(), "what's a good banana bread recipe?".into());
        let assembler = assembler();
        let audit = assembler
            .assemble(AuditInput {
                state: &state,
                response_text: "Here's a simple recipe.",
                policy_versions: PolicyVersions::default(),
                gates_executed: vec![GateId::Intent],
                model: Some("primary".to_string()),
                intervention_applied: None,
                trust_violations: vec![],
                linguistic_violations: vec![],
                constraints: vec![],
            })
            .await
            .unwrap();

        assert!(!audit.redaction_applied);
        assert!(audit.redacted_patterns.is_empty());
    }
}
