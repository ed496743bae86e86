// [apps/gateway/src/gates/intent.rs]
//! Intent gate (spec S4.1 step 1). No dedicated domain crate backs this
//! one — unlike Shield's classifier, whose output `risk-classifier`
//! normalizes into a `RiskSummary`, the intent classifier's output is
//! opaque routing metadata the rest of the pipeline reads as plain JSON
//! (`state.intent`). Fails open: a classifier outage must never block a
//! conversation before Shield has even had a chance to run.

use std::sync::Arc;

use async_trait::async_trait;
use novaos_cognition::{CompletionRequest, LlmProvider};
use novaos_gate_strategy::GateHandler;
use novaos_models::{GateId, GateResult, PipelineState, RequestContext};

/// Fixed rubric for the routing classifier. Output shape mirrors what
/// `stance.rs` and `capability.rs` read back out of `state.intent`:
/// `stance_hint` one of lens/sword/shield/control, `live_data` a list of
/// capability names, `domain` one of health/legal/finance/mental_health
/// when applicable.
const INTENT_RUBRIC: &str = r#"Classify the user's message. Output strict JSON with this shape:

{"primary_route": "conversation|task|lookup", "stance_hint": "lens|sword|shield|control", "urgency": "low|normal|high", "live_data": ["stock_fetcher"|"weather_fetcher"|"crypto_fetcher"|"fx_fetcher"|"time_fetcher"|"web_searcher", ...], "learning_intent": true|false, "domain": "health|legal|finance|mental_health|general", "topic": "a few words describing the subject"}

`stance_hint` should be "sword" only for goal/task/reminder management requests, "control" only when the message itself reports a life-threatening emergency, "shield" never (Shield decides that on its own), otherwise "lens". `live_data` should list only capabilities a correct answer actually requires."#;

pub struct IntentGate {
    classifier: Arc<dyn LlmProvider>,
}

impl IntentGate {
    pub fn new(classifier: Arc<dyn LlmProvider>) -> Self {
        Self { classifier }
    }
}

#[async_trait]
impl GateHandler for IntentGate {
    fn gate_id(&self) -> GateId {
        GateId::Intent
    }

    async fn run(&self, _ctx: &RequestContext, state: &PipelineState, _regeneration_hint: Option<&str>) -> GateResult<PipelineState> {
        let request = CompletionRequest {
            system_prompt: INTENT_RUBRIC.to_string(),
            user_prompt: state.normalized_message.clone(),
            temperature: 0.0,
            max_tokens: 256,
        };

        let response = match self.classifier.complete(&request).await {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(error = %error, "intent classifier call failed, continuing without routing hints");
                return GateResult::pass(GateId::Intent, state.clone(), 0);
            }
        };

        match serde_json::from_str::<serde_json::Value>(&response.content) {
            Ok(intent) => GateResult::pass(GateId::Intent, state.with_intent(intent), 0),
            Err(error) => {
                tracing::warn!(error = %error, "intent classifier returned malformed JSON, continuing without routing hints");
                GateResult::pass(GateId::Intent, state.clone(), 0)
            }
        }
    }
}
