// [libs/domain/models/src/audit.rs]
//! Audit record shape (spec S3 ResponseAudit, S4.11) and policy-version
//! capture (spec glossary: "Policy version").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pipeline::GateId;

/// Monotonic version counters, one per policy domain (spec glossary).
/// Captured verbatim into every audit record so a later dispute can be
/// resolved against the exact policy revision that produced a reply.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyVersions {
    pub capability_matrix: u32,
    pub constraints: u32,
    pub verification: u32,
    pub freshness: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseAudit {
    pub request_id: String,
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    pub policy_versions: PolicyVersions,
    /// Full 64-hex-char SHA-256, never truncated (spec S4.11 step 1).
    pub input_hash: String,
    pub output_hash: String,
    pub snapshot_ref: String,
    pub snapshot_key_version: u32,
    pub redaction_applied: bool,
    pub redacted_patterns: Vec<String>,
    pub gates_executed: Vec<GateId>,
    pub stance: crate::pipeline::Stance,
    pub model: Option<String>,
    pub intervention_applied: Option<String>,
    pub ack_override_applied: bool,
    pub response_generated: bool,
    pub regeneration_count: u8,
    pub stopped_at: Option<GateId>,
    pub stopped_reason: Option<String>,
    pub trust_violations: Vec<String>,
    pub linguistic_violations: Vec<String>,
}
