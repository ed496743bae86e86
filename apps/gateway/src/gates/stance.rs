// [apps/gateway/src/gates/stance.rs]
//! Stance gate (spec S4.1 step 4). Picks which persona answers the
//! request. Shield always wins: if it has already forced
//! `Stance::Control` this request never reaches here with anything else
//! to decide, so a prior `Control` stance passes through untouched rather
//! than being second-guessed by the Intent gate's hint.

use async_trait::async_trait;
use novaos_gate_strategy::GateHandler;
use novaos_models::{GateId, GateResult, PipelineState, RequestContext, Stance};

#[derive(Default)]
pub struct StanceGate;

impl StanceGate {
    pub fn new() -> Self {
        Self
    }

    fn hinted_stance(state: &PipelineState) -> Stance {
        let hint = state.intent.as_ref().and_then(|intent| intent.get("stance_hint")).and_then(|hint| hint.as_str());
        match hint {
            Some("sword") => Stance::Sword,
            Some("shield") => Stance::Shield,
            Some("control") => Stance::Control,
            _ => Stance::Lens,
        }
    }
}

#[async_trait]
impl GateHandler for StanceGate {
    fn gate_id(&self) -> GateId {
        GateId::Stance
    }

    async fn run(&self, _ctx: &RequestContext, state: &PipelineState, _regeneration_hint: Option<&str>) -> GateResult<PipelineState> {
        if state.stance == Stance::Control {
            return GateResult::pass(GateId::Stance, state.clone(), 0);
        }

        let target = Self::hinted_stance(state);
        let next = state.with_stance(target);
        GateResult::redirect(GateId::Stance, next, target, 0)
    }
}
