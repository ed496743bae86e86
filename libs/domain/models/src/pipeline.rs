// [libs/domain/models/src/pipeline.rs]
//! The per-request state machine (spec S3 PipelineState, GateResult<T>) and
//! the fixed gate ordering the orchestrator drives it through (spec S4.1).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::evidence::EvidencePack;
use crate::risk::RiskSummary;

/// Canonical gate order. The orchestrator iterates this slice; nothing else
/// in the codebase is allowed to define a second ordering.
pub const GATE_ORDER: [GateId; 8] = [
    GateId::Intent,
    GateId::Shield,
    GateId::Lens,
    GateId::Stance,
    GateId::Capability,
    GateId::Model,
    GateId::Constitutional,
    GateId::Memory,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateId {
    Intent,
    Shield,
    Lens,
    Stance,
    Capability,
    Model,
    Constitutional,
    Memory,
}

impl GateId {
    pub fn as_str(&self) -> &'static str {
        match self {
            GateId::Intent => "intent",
            GateId::Shield => "shield",
            GateId::Lens => "lens",
            GateId::Stance => "stance",
            GateId::Capability => "capability",
            GateId::Model => "model",
            GateId::Constitutional => "constitutional",
            GateId::Memory => "memory",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateStatus {
    Pass,
    SoftFail,
    HardFail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateAction {
    Continue,
    Regenerate,
    AwaitAck,
    Stop,
    Redirect,
}

/// Output of a single gate. `status`/`action` are constrained by the
/// invariant in spec S3: `action=stop ⇒ status=hard_fail`, and
/// `action=await_ack ⇒ status=soft_fail` with a pending-ack payload present
/// in `output`. Those invariants are enforced by [`GateResult::stop`] and
/// [`GateResult::await_ack`] rather than by the plain struct literal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateResult<T> {
    pub gate_id: GateId,
    pub status: GateStatus,
    pub action: GateAction,
    pub output: T,
    pub failure_reason: Option<String>,
    pub execution_time_ms: u64,
    pub redirect_target: Option<Stance>,
}

impl<T> GateResult<T> {
    pub fn pass(gate_id: GateId, output: T, execution_time_ms: u64) -> Self {
        Self {
            gate_id,
            status: GateStatus::Pass,
            action: GateAction::Continue,
            output,
            failure_reason: None,
            execution_time_ms,
            redirect_target: None,
        }
    }

    pub fn soft_fail(gate_id: GateId, output: T, reason: impl Into<String>, execution_time_ms: u64) -> Self {
        Self {
            gate_id,
            status: GateStatus::SoftFail,
            action: GateAction::Continue,
            output,
            failure_reason: Some(reason.into()),
            execution_time_ms,
            redirect_target: None,
        }
    }

    pub fn stop(gate_id: GateId, output: T, reason: impl Into<String>, execution_time_ms: u64) -> Self {
        Self {
            gate_id,
            status: GateStatus::HardFail,
            action: GateAction::Stop,
            output,
            failure_reason: Some(reason.into()),
            execution_time_ms,
            redirect_target: None,
        }
    }

    pub fn await_ack(gate_id: GateId, output: T, reason: impl Into<String>, execution_time_ms: u64) -> Self {
        Self {
            gate_id,
            status: GateStatus::SoftFail,
            action: GateAction::AwaitAck,
            output,
            failure_reason: Some(reason.into()),
            execution_time_ms,
            redirect_target: None,
        }
    }

    pub fn redirect(gate_id: GateId, output: T, target: Stance, execution_time_ms: u64) -> Self {
        Self {
            gate_id,
            status: GateStatus::Pass,
            action: GateAction::Redirect,
            output,
            failure_reason: None,
            execution_time_ms,
            redirect_target: Some(target),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stance {
    Lens,
    Sword,
    Shield,
    Control,
}

/// Immutable, per-request context threaded through every gate call —
/// distinct from [`PipelineState`], which is the thing gates *produce*.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub user_id: String,
    pub policy_version: u32,
    pub cancellation: tokio_util::sync::CancellationToken,
}

/// The evolving per-request record (spec S3). Gates never receive `&mut
/// PipelineState`; each returns a [`GateResult`] whose output the
/// orchestrator folds into a brand new `PipelineState` via
/// [`PipelineState::with_gate_output`] or one of the dedicated mutators
/// below. `regeneration_count` is the only field that survives a
/// regeneration reset of `generation`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineState {
    pub request_id: String,
    pub user_id: String,
    pub user_message: String,
    pub normalized_message: String,
    pub ack_token: Option<String>,
    pub ack_text: Option<String>,
    pub ack_token_valid: Option<bool>,
    pub intent: Option<serde_json::Value>,
    pub lens_result: Option<serde_json::Value>,
    pub stance: Stance,
    pub risk_summary: Option<RiskSummary>,
    pub evidence_pack: Option<EvidencePack>,
    pub generation: Option<String>,
    pub regeneration_count: u8,
    pub stopped_at: Option<GateId>,
    pub stopped_reason: Option<String>,
    pub start_time_ms: i64,
}

impl PipelineState {
    pub fn new(request_id: String, user_id: String, user_message: String, normalized_message: String) -> Self {
        Self {
            request_id,
            user_id,
            user_message,
            normalized_message,
            ack_token: None,
            ack_text: None,
            ack_token_valid: None,
            intent: None,
            lens_result: None,
            stance: Stance::Lens,
            risk_summary: None,
            evidence_pack: None,
            generation: None,
            regeneration_count: 0,
            stopped_at: None,
            stopped_reason: None,
            start_time_ms: Utc::now().timestamp_millis(),
        }
    }

    /// Returns a clone with `stance` replaced. Named per-field "with"
    /// mutators are the clone-then-replace update rule made concrete.
    pub fn with_stance(&self, stance: Stance) -> Self {
        let mut next = self.clone();
        next.stance = stance;
        next
    }

    pub fn with_intent(&self, intent: serde_json::Value) -> Self {
        let mut next = self.clone();
        next.intent = Some(intent);
        next
    }

    pub fn with_risk_summary(&self, risk_summary: RiskSummary) -> Self {
        let mut next = self.clone();
        next.risk_summary = Some(risk_summary);
        next
    }

    pub fn with_lens_result(&self, lens_result: serde_json::Value) -> Self {
        let mut next = self.clone();
        next.lens_result = Some(lens_result);
        next
    }

    pub fn with_evidence_pack(&self, evidence_pack: EvidencePack) -> Self {
        let mut next = self.clone();
        next.evidence_pack = Some(evidence_pack);
        next
    }

    pub fn with_generation(&self, generation: String) -> Self {
        let mut next = self.clone();
        next.generation = Some(generation);
        next
    }

    pub fn stopped(&self, gate_id: GateId, reason: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.stopped_at = Some(gate_id);
        next.stopped_reason = Some(reason.into());
        next
    }

    /// Regeneration resets only `generation`; `regeneration_count` is the
    /// one field that must survive across the reset (spec S3 invariant).
    pub fn regenerated(&self) -> Self {
        let mut next = self.clone();
        next.generation = None;
        next.regeneration_count += 1;
        next
    }

    pub fn elapsed_ms(&self) -> i64 {
        Utc::now().timestamp_millis() - self.start_time_ms
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PipelineTimestamp(pub DateTime<Utc>);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regenerated_resets_generation_and_bumps_count() {
        let state = PipelineState::new("req-1".into(), "user-1".into(), "hi".into(), "hi".into())
            .with_generation("draft one".into());
        let regenerated = state.regenerated();
        assert_eq!(regenerated.generation, None);
        assert_eq!(regenerated.regeneration_count, 1);
        assert_eq!(state.regeneration_count, 0, "original state must stay untouched (clone-then-replace)");
    }

    #[test]
    fn gate_result_invariants_hold_for_constructors() {
        let stopped: GateResult<()> = GateResult::stop(GateId::Shield, (), "hard veto", 5);
        assert_eq!(stopped.status, GateStatus::HardFail);
        assert_eq!(stopped.action, GateAction::Stop);

        let pending: GateResult<()> = GateResult::await_ack(GateId::Shield, (), "soft veto", 5);
        assert_eq!(pending.status, GateStatus::SoftFail);
        assert_eq!(pending.action, GateAction::AwaitAck);
    }

    #[test]
    fn gate_order_matches_spec_sequence() {
        assert_eq!(GATE_ORDER[0], GateId::Intent);
        assert_eq!(GATE_ORDER[7], GateId::Memory);
        assert_eq!(GATE_ORDER.len(), 8);
    }
}
