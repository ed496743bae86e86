// [apps/gateway/src/gates/constitutional.rs]
//! Constitutional gate (spec S4.1 step 7, S4.7). Judges the Model gate's
//! output against the fixed rubric. `GateResult` has no dedicated
//! `regenerate` constructor — unlike `stop`/`await_ack`, the orchestrator
//! itself owns the regeneration cap, so this gate only needs to hand back
//! the raw action and let `GatePipeline::run` decide whether to loop or
//! give up.

use novaos_cognition::{ConstitutionalAction, ConstitutionalValidator};
use async_trait::async_trait;
use novaos_gate_strategy::GateHandler;
use novaos_models::{GateAction, GateId, GateResult, GateStatus, PipelineState, RequestContext};

pub struct ConstitutionalGate {
    validator: ConstitutionalValidator,
}

impl ConstitutionalGate {
    pub fn new(validator: ConstitutionalValidator) -> Self {
        Self { validator }
    }
}

#[async_trait]
impl GateHandler for ConstitutionalGate {
    fn gate_id(&self) -> GateId {
        GateId::Constitutional
    }

    async fn run(&self, _ctx: &RequestContext, state: &PipelineState, _regeneration_hint: Option<&str>) -> GateResult<PipelineState> {
        let generated = state.generation.clone().unwrap_or_default();

        match self.validator.validate(&generated).await {
            ConstitutionalAction::Pass => GateResult::pass(GateId::Constitutional, state.clone(), 0),
            ConstitutionalAction::Regenerate { fix_guidance } => GateResult {
                gate_id: GateId::Constitutional,
                status: GateStatus::SoftFail,
                action: GateAction::Regenerate,
                output: state.clone(),
                failure_reason: Some(fix_guidance),
                execution_time_ms: 0,
                redirect_target: None,
            },
        }
    }
}
