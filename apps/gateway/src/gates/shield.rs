// [apps/gateway/src/gates/shield.rs]
//! Shield gate (spec S4.2). Classifies risk, applies the decision table,
//! and owns the acknowledgment bypass path: a resubmission carrying a
//! valid `ack_token` + matching `ack_text` skips classification entirely.
//! Shield's veto always wins over whatever Stance the Intent gate hinted
//! at — a `death_risk` classification forces `Stance::Control` via
//! `GateResult::redirect` regardless of what runs after this gate.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use novaos_cognition::{CompletionRequest, LlmProvider};
use novaos_gate_strategy::GateHandler;
use novaos_models::{GateId, GateResult, InterventionLevel, PipelineState, RequestContext, RiskSummary, Stance, VetoType};
use novaos_risk_classifier::{ConsistencyNormalizer, RawClassification, SHIELD_RUBRIC};
use novaos_token_forge::{AckToken, IssueAckTokenInput, TokenForge, ValidateAckInput};

/// Phrase a reckless-decision soft veto requires back verbatim (NFKC
/// case-folded) before Shield bypasses classification on resubmission.
const REQUIRED_ACK_PHRASE: &str = "i understand the risk";
const ACK_TOKEN_TTL: Duration = Duration::minutes(10);

pub struct ShieldGate {
    classifier: Arc<dyn LlmProvider>,
    token_forge: Arc<TokenForge>,
}

impl ShieldGate {
    pub fn new(classifier: Arc<dyn LlmProvider>, token_forge: Arc<TokenForge>) -> Self {
        Self { classifier, token_forge }
    }

    fn domain_hint(state: &PipelineState) -> Option<String> {
        state.intent.as_ref()?.get("domain")?.as_str().map(str::to_string)
    }

    async fn classify(&self, state: &PipelineState) -> RiskSummary {
        let audit_id = state.request_id.clone();
        let request = CompletionRequest {
            system_prompt: SHIELD_RUBRIC.to_string(),
            user_prompt: state.normalized_message.clone(),
            temperature: 0.0,
            max_tokens: 256,
        };

        let response = match self.classifier.complete(&request).await {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(error = %error, "shield classifier call failed, failing open");
                return ConsistencyNormalizer::fail_open(&audit_id);
            }
        };

        match RawClassification::from_json(&response.content) {
            Ok(raw) => ConsistencyNormalizer::normalize(&raw, &audit_id, Self::domain_hint(state).as_deref()),
            Err(error) => {
                tracing::warn!(error = %error, "shield classifier returned malformed JSON, failing open");
                ConsistencyNormalizer::fail_open(&audit_id)
            }
        }
    }

    async fn try_bypass(&self, state: &PipelineState) -> Option<RiskSummary> {
        let (encoded_token, ack_text) = match (&state.ack_token, &state.ack_text) {
            (Some(token), Some(text)) => (token, text),
            _ => return None,
        };

        let token = match AckToken::decode(encoded_token) {
            Ok(token) => token,
            Err(error) => {
                tracing::warn!(error = %error, "ack token failed to decode, falling back to classification");
                return None;
            }
        };

        let validation = self
            .token_forge
            .validate(
                &token,
                ValidateAckInput {
                    requesting_user_id: &state.user_id,
                    current_message: &state.normalized_message,
                    provided_ack_text: ack_text,
                    required_text: REQUIRED_ACK_PHRASE,
                    now: Utc::now(),
                },
            )
            .await;

        match validation {
            Ok(()) => Some(RiskSummary {
                intervention_level: InterventionLevel::Nudge,
                veto_type: Some(VetoType::Soft),
                stakes_level: "medium".to_string(),
                reason: token.reason.clone(),
                audit_id: token.audit_id.clone(),
                pending_ack: None,
                control_trigger: None,
                crisis_resources: None,
                override_applied: Some(true),
            }),
            Err(error) => {
                tracing::warn!(error = %error, "ack bypass rejected, falling back to classification");
                None
            }
        }
    }
}

#[async_trait]
impl GateHandler for ShieldGate {
    fn gate_id(&self) -> GateId {
        GateId::Shield
    }

    async fn run(&self, _ctx: &RequestContext, state: &PipelineState, _regeneration_hint: Option<&str>) -> GateResult<PipelineState> {
        if let Some(risk_summary) = self.try_bypass(state).await {
            let next = state.with_risk_summary(risk_summary);
            return GateResult::pass(GateId::Shield, next, 0);
        }

        let risk_summary = self.classify(state).await;

        match (risk_summary.intervention_level, risk_summary.veto_type) {
            (InterventionLevel::Veto, Some(VetoType::Hard)) => {
                let reason = risk_summary.reason.clone();
                let next = state.with_risk_summary(risk_summary).stopped(GateId::Shield, reason.clone());
                GateResult::stop(GateId::Shield, next, reason, 0)
            }
            (InterventionLevel::Veto, Some(VetoType::Soft)) => {
                let ack = self.token_forge.issue(IssueAckTokenInput {
                    request_id: &state.request_id,
                    user_id: &state.user_id,
                    user_message: &state.normalized_message,
                    reason: &risk_summary.reason,
                    audit_id: &risk_summary.audit_id,
                    ttl: ACK_TOKEN_TTL,
                });
                let reason = risk_summary.reason.clone();
                let next = state.with_risk_summary(RiskSummary {
                    pending_ack: Some(novaos_models::risk::PendingAck {
                        ack_token: ack.encode(),
                        required_text: REQUIRED_ACK_PHRASE.to_string(),
                        expires_at: ack.expires_at,
                        audit_id: risk_summary.audit_id.clone(),
                    }),
                    ..risk_summary
                });
                GateResult::await_ack(GateId::Shield, next, reason, 0)
            }
            (InterventionLevel::Veto, None) => {
                // death_risk: Shield wins over whatever Stance the Intent gate
                // hinted at, forcing a redirect to Control regardless of what
                // runs downstream.
                let next = state.with_risk_summary(risk_summary).with_stance(Stance::Control);
                GateResult::redirect(GateId::Shield, next, Stance::Control, 0)
            }
            _ => {
                let next = state.with_risk_summary(risk_summary);
                GateResult::pass(GateId::Shield, next, 0)
            }
        }
    }
}
