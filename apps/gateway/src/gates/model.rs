// [apps/gateway/src/gates/model.rs]
//! Model gate (spec S4.1 step 6, S4.6). Generates the reply: composes a
//! system prompt from a fixed policy plus per-request `GenerationConstraints`
//! derived from the evidence pack and risk summary, sends it down the
//! provider chain, and patches the result against any post-constraint the
//! model didn't already satisfy on its own. A `regeneration_hint` from a
//! prior Constitutional rejection is folded straight into the regenerated
//! user message ("original + FIX: <guidance>") rather than into the
//! constraints — it's free-text rewriting advice, not a banned phrase.

use std::sync::Arc;

use async_trait::async_trait;
use novaos_cognition::{apply_post_constraints, compose_prompt, CompletionRequest, GenerationConstraints, ProviderChain};
use novaos_evidence::build_envelope;
use novaos_gate_strategy::GateHandler;
use novaos_models::{
    ConstraintLevel, EvidencePack, GateAction, GateId, GateResult, GateStatus, InterventionLevel, PipelineState, RequestContext,
};
use once_cell::sync::Lazy;
use regex::Regex;

const POLICY_SYSTEM_PROMPT: &str = "You are NovaOS, a careful and direct conversational assistant. Answer the user's question plainly and do not pad your reply with unnecessary caveats.";

static NUMERIC_LITERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"-?\d+(?:\.\d+)?").expect("static numeric-literal pattern is valid regex"));

/// Spec S8 property 6 enforcement: the first numeric literal in `text` the
/// evidence pack doesn't permit, or `None` if every literal checks out.
fn first_numeric_violation(text: &str, evidence: &EvidencePack) -> Option<String> {
    NUMERIC_LITERAL.find_iter(text).find_map(|candidate| {
        let literal: f64 = candidate.as_str().parse().ok()?;
        if evidence.permits_numeric_literal(literal) {
            None
        } else {
            Some(candidate.as_str().to_string())
        }
    })
}

pub struct ModelGate {
    chain: Arc<ProviderChain>,
}

impl ModelGate {
    pub fn new(chain: Arc<ProviderChain>) -> Self {
        Self { chain }
    }

    fn regenerated_message(state: &PipelineState, regeneration_hint: Option<&str>) -> String {
        match regeneration_hint {
            Some(guidance) => format!("{}\n\nFIX: {}", state.normalized_message, guidance),
            None => state.normalized_message.clone(),
        }
    }

    fn constraints_for(state: &PipelineState) -> GenerationConstraints {
        let evidence = state.evidence_pack.as_ref();
        let allow_numeric_precision = evidence.map(|pack| pack.constraint_level == ConstraintLevel::QuoteEvidenceOnly).unwrap_or(true);

        let mut constraints = GenerationConstraints { allow_numeric_precision, allow_action_recommendations: true, ..Default::default() };

        if let Some(risk) = &state.risk_summary {
            if risk.intervention_level >= InterventionLevel::Friction {
                constraints.allow_action_recommendations = false;
            }
            if let Some(resources) = &risk.crisis_resources {
                if !resources.is_empty() {
                    constraints.must_prepend = Some(resources.join("\n"));
                }
            }
        }

        constraints
    }
}

#[async_trait]
impl GateHandler for ModelGate {
    fn gate_id(&self) -> GateId {
        GateId::Model
    }

    async fn run(&self, _ctx: &RequestContext, state: &PipelineState, regeneration_hint: Option<&str>) -> GateResult<PipelineState> {
        let empty_pack = EvidencePack::empty(ConstraintLevel::QualitativeOnly);
        let evidence = state.evidence_pack.as_ref().unwrap_or(&empty_pack);
        let user_message = Self::regenerated_message(state, regeneration_hint);
        let envelope = build_envelope(evidence, &user_message);
        let constraints = Self::constraints_for(state);
        let (system_prompt, user_prompt) = compose_prompt(POLICY_SYSTEM_PROMPT, &constraints, &envelope);

        let request = CompletionRequest { system_prompt, user_prompt, temperature: 0.7, max_tokens: 1024 };

        match self.chain.complete(&request).await {
            Ok(response) => {
                if let Some(offending) = first_numeric_violation(&response.content, evidence) {
                    let reason = format!("reply states an unverified numeric figure ({offending}) not present in the evidence pack");
                    return GateResult {
                        gate_id: GateId::Model,
                        status: GateStatus::SoftFail,
                        action: GateAction::Regenerate,
                        output: state.with_generation(response.content),
                        failure_reason: Some(reason),
                        execution_time_ms: 0,
                        redirect_target: None,
                    };
                }

                let generation = apply_post_constraints(&response.content, &constraints);
                GateResult::pass(GateId::Model, state.with_generation(generation), 0)
            }
            Err(error) => {
                let reason = error.to_string();
                let next = state.clone().stopped(GateId::Model, reason.clone());
                GateResult::stop(GateId::Model, next, reason, 0)
            }
        }
    }
}
