// [libs/domain/models/src/risk.rs]
//! Shield gate output (spec S3 RiskSummary, S4.2).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionLevel {
    None,
    Nudge,
    Friction,
    Veto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VetoType {
    Soft,
    Hard,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskSummary {
    pub intervention_level: InterventionLevel,
    pub veto_type: Option<VetoType>,
    pub stakes_level: String,
    pub reason: String,
    pub audit_id: String,
    pub pending_ack: Option<PendingAck>,
    pub control_trigger: Option<String>,
    pub crisis_resources: Option<Vec<String>>,
    pub override_applied: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingAck {
    pub ack_token: String,
    pub required_text: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub audit_id: String,
}
